//! Voxel sample types and payload encoding

use crate::error::{NrrdError, Result};
use crate::header::NrrdHeader;
use crate::types::{DataType, Encoding, Endian};
use byteorder::{BigEndian, ByteOrder, LittleEndian};
use num_traits::NumCast;
use std::fmt;
use std::str::FromStr;

/// A primitive sample type that can live in an NRRD payload
pub trait VoxelElement:
    Copy + Default + PartialOrd + fmt::Debug + fmt::Display + FromStr + NumCast + Send + Sync + 'static
{
    /// Type tag written in the header
    const DATA_TYPE: DataType;

    /// Encode `values` into `out`, which holds exactly `values.len() * size` bytes
    fn write_raw(values: &[Self], endian: Endian, out: &mut [u8]);

    /// Decode `out.len()` samples from `bytes`
    fn read_raw(bytes: &[u8], endian: Endian, out: &mut [Self]);
}

impl VoxelElement for u8 {
    const DATA_TYPE: DataType = DataType::U8;

    fn write_raw(values: &[Self], _endian: Endian, out: &mut [u8]) {
        out.copy_from_slice(values);
    }

    fn read_raw(bytes: &[u8], _endian: Endian, out: &mut [Self]) {
        out.copy_from_slice(bytes);
    }
}

impl VoxelElement for i8 {
    const DATA_TYPE: DataType = DataType::I8;

    fn write_raw(values: &[Self], _endian: Endian, out: &mut [u8]) {
        for (dst, src) in out.iter_mut().zip(values) {
            *dst = *src as u8;
        }
    }

    fn read_raw(bytes: &[u8], _endian: Endian, out: &mut [Self]) {
        for (dst, src) in out.iter_mut().zip(bytes) {
            *dst = *src as i8;
        }
    }
}

macro_rules! impl_voxel_element {
    ($ty:ty, $data_type:expr, $read:ident, $write:ident) => {
        impl VoxelElement for $ty {
            const DATA_TYPE: DataType = $data_type;

            fn write_raw(values: &[Self], endian: Endian, out: &mut [u8]) {
                match endian {
                    Endian::Little => LittleEndian::$write(values, out),
                    Endian::Big => BigEndian::$write(values, out),
                }
            }

            fn read_raw(bytes: &[u8], endian: Endian, out: &mut [Self]) {
                match endian {
                    Endian::Little => LittleEndian::$read(bytes, out),
                    Endian::Big => BigEndian::$read(bytes, out),
                }
            }
        }
    };
}

impl_voxel_element!(i16, DataType::I16, read_i16_into, write_i16_into);
impl_voxel_element!(u16, DataType::U16, read_u16_into, write_u16_into);
impl_voxel_element!(i32, DataType::I32, read_i32_into, write_i32_into);
impl_voxel_element!(u32, DataType::U32, read_u32_into, write_u32_into);
impl_voxel_element!(i64, DataType::I64, read_i64_into, write_i64_into);
impl_voxel_element!(u64, DataType::U64, read_u64_into, write_u64_into);
impl_voxel_element!(f32, DataType::F32, read_f32_into, write_f32_into);
impl_voxel_element!(f64, DataType::F64, read_f64_into, write_f64_into);

/// Encode samples (already in NRRD order) according to the header's encoding.
///
/// Text payloads put one fastest-axis row per line.
pub fn encode_payload<T: VoxelElement>(values: &[T], header: &NrrdHeader) -> Result<Vec<u8>> {
    check_type::<T>(header)?;
    if values.len() != header.element_count() {
        return Err(NrrdError::ShapeMismatch(format!(
            "header declares {} samples but {} were supplied",
            header.element_count(),
            values.len()
        )));
    }

    match header.encoding {
        Encoding::Raw => {
            let mut out = vec![0u8; header.payload_len()];
            T::write_raw(values, header.endian.unwrap_or_default(), &mut out);
            Ok(out)
        }
        Encoding::Ascii => {
            let row_len = header.sizes.first().copied().unwrap_or(1).max(1);
            let mut text = String::new();
            for row in values.chunks(row_len) {
                for (i, value) in row.iter().enumerate() {
                    if i > 0 {
                        text.push(' ');
                    }
                    text.push_str(&value.to_string());
                }
                text.push('\n');
            }
            Ok(text.into_bytes())
        }
    }
}

/// Decode the payload that follows `header` into samples in NRRD order
pub fn decode_payload<T: VoxelElement>(payload: &[u8], header: &NrrdHeader) -> Result<Vec<T>> {
    check_type::<T>(header)?;
    let payload = skip_lines(payload, header.line_skip)?;
    let count = header.element_count();

    match header.encoding {
        Encoding::Raw => {
            let expected = header.payload_len();
            let data = match header.byte_skip {
                -1 => payload
                    .len()
                    .checked_sub(expected)
                    .map(|start| &payload[start..])
                    .ok_or_else(inconsistent_length)?,
                skip => payload.get(skip as usize..).ok_or_else(inconsistent_length)?,
            };
            if data.len() != expected {
                return Err(inconsistent_length());
            }
            let endian = match header.endian {
                Some(endian) => endian,
                None if T::DATA_TYPE.size_in_bytes() == 1 => Endian::native(),
                None => return Err(NrrdError::MissingField("endian".to_string())),
            };
            let mut out = vec![T::default(); count];
            T::read_raw(data, endian, &mut out);
            Ok(out)
        }
        Encoding::Ascii => {
            let text = std::str::from_utf8(payload)
                .map_err(|_| NrrdError::InvalidFormat("text payload is not valid UTF-8".to_string()))?;
            let values = text
                .split(|c: char| c.is_whitespace() || c == ',')
                .filter(|token| !token.is_empty())
                .map(parse_sample::<T>)
                .collect::<Result<Vec<T>>>()?;
            if values.len() != count {
                return Err(inconsistent_length());
            }
            Ok(values)
        }
    }
}

fn check_type<T: VoxelElement>(header: &NrrdHeader) -> Result<()> {
    if header.data_type != T::DATA_TYPE {
        return Err(NrrdError::TypeMismatch {
            expected: T::DATA_TYPE.to_string(),
            found: header.data_type.to_string(),
        });
    }
    Ok(())
}

/// Integers written as `3.0` are accepted; fractional values are not
fn parse_sample<T: VoxelElement>(token: &str) -> Result<T> {
    if let Ok(value) = token.parse::<T>() {
        return Ok(value);
    }
    token
        .parse::<f64>()
        .ok()
        .filter(|value| !T::DATA_TYPE.is_integer() || value.fract() == 0.0)
        .and_then(|value| <T as NumCast>::from(value))
        .ok_or_else(|| NrrdError::invalid_value("data", token))
}

fn skip_lines(payload: &[u8], lines: usize) -> Result<&[u8]> {
    let mut rest = payload;
    for _ in 0..lines {
        let newline = rest
            .iter()
            .position(|&b| b == b'\n')
            .ok_or_else(|| NrrdError::InvalidFormat("line skip runs past end of file".to_string()))?;
        rest = &rest[newline + 1..];
    }
    Ok(rest)
}

fn inconsistent_length() -> NrrdError {
    NrrdError::InvalidFormat("inconsistent data buffer length".to_string())
}
