//! Byte-level framing of header and payload

use crate::error::{NrrdError, Result};
use crate::header::NrrdHeader;

/// Turns a header plus encoded payload into file bytes and back
pub trait VolumeCodec: Send + Sync {
    /// Frame `payload` behind the rendered `header`
    fn encode(&self, header: &NrrdHeader, payload: &[u8]) -> Result<Vec<u8>>;

    /// Split file bytes into the parsed header and the payload that follows it
    fn decode<'a>(&self, bytes: &'a [u8]) -> Result<(NrrdHeader, &'a [u8])>;
}

/// Attached-header NRRD files
#[derive(Debug, Default, Clone, Copy)]
pub struct NrrdCodec;

impl VolumeCodec for NrrdCodec {
    fn encode(&self, header: &NrrdHeader, payload: &[u8]) -> Result<Vec<u8>> {
        header.validate()?;
        if header.encoding.is_binary() && payload.len() != header.payload_len() {
            return Err(NrrdError::ShapeMismatch(format!(
                "header declares {} payload bytes ({} x {}) but {} were supplied",
                header.payload_len(),
                header.element_count(),
                header.data_type,
                payload.len()
            )));
        }

        let text = header.to_text();
        let mut bytes = Vec::with_capacity(text.len() + payload.len());
        bytes.extend_from_slice(text.as_bytes());
        bytes.extend_from_slice(payload);
        Ok(bytes)
    }

    fn decode<'a>(&self, bytes: &'a [u8]) -> Result<(NrrdHeader, &'a [u8])> {
        let (header, offset) = NrrdHeader::parse(bytes)?;
        Ok((header, &bytes[offset..]))
    }
}

/// Encode with the default codec
pub fn encode_volume(header: &NrrdHeader, payload: &[u8]) -> Result<Vec<u8>> {
    NrrdCodec.encode(header, payload)
}

/// Decode with the default codec
pub fn decode_volume(bytes: &[u8]) -> Result<(NrrdHeader, &[u8])> {
    NrrdCodec.decode(bytes)
}
