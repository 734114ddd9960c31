//! Reading and writing NRRD volume files

use crate::codec::{decode_volume, encode_volume};
use crate::element::{encode_payload, VoxelElement};
use crate::error::Result;
use crate::header::NrrdHeader;
use crate::metadata::{VolumeMetadata, WriteOptions};
use crate::volume::{to_array, DynVolume};
use ndarray::Array3;
use std::borrow::Cow;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Build the complete file image for `voxels` without touching the filesystem.
///
/// The array is taken in C order as `(slices, rows, columns)`; element type and
/// extents come from the array itself.
pub fn encode_array<T: VoxelElement>(
    voxels: &Array3<T>,
    metadata: &VolumeMetadata,
    options: &WriteOptions,
) -> Result<Vec<u8>> {
    let (slices, rows, columns) = voxels.dim();
    let header = NrrdHeader::for_volume(T::DATA_TYPE, [slices, rows, columns], metadata, options);

    let samples: Cow<[T]> = match voxels.as_slice() {
        Some(slice) => Cow::Borrowed(slice),
        None => Cow::Owned(voxels.iter().copied().collect()),
    };
    let payload = encode_payload(&samples, &header)?;
    encode_volume(&header, &payload)
}

/// Parse a complete file image into its header and a typed C-order array
pub fn decode_array<T: VoxelElement>(bytes: &[u8]) -> Result<(NrrdHeader, Array3<T>)> {
    let (header, payload) = decode_volume(bytes)?;
    let voxels = to_array(&header, payload)?;
    Ok((header, voxels))
}

/// Write `voxels` to `path` as a raw little-endian NRRD file in LPS space.
///
/// Creates or overwrites the file. The whole image is encoded before the file
/// is opened, so encoding failures never leave a file behind.
pub fn write_volume<T: VoxelElement>(
    path: impl AsRef<Path>,
    voxels: &Array3<T>,
    metadata: &VolumeMetadata,
) -> Result<()> {
    write_volume_with_options(path, voxels, metadata, &WriteOptions::default())
}

/// Write `voxels` to `path` with explicit encoding options
pub fn write_volume_with_options<T: VoxelElement>(
    path: impl AsRef<Path>,
    voxels: &Array3<T>,
    metadata: &VolumeMetadata,
    options: &WriteOptions,
) -> Result<()> {
    let path = path.as_ref();
    let bytes = encode_array(voxels, metadata, options)?;
    fs::write(path, &bytes)?;

    log::debug!(
        "wrote {} volume {:?} to {} ({} bytes)",
        T::DATA_TYPE,
        voxels.dim(),
        path.display(),
        bytes.len()
    );
    Ok(())
}

/// Read the voxels of a 3D NRRD file; geometry is parsed and dropped
pub fn read_volume<T: VoxelElement>(path: impl AsRef<Path>) -> Result<Array3<T>> {
    read_volume_with_header(path).map(|(_, voxels)| voxels)
}

/// Read the voxels together with the parsed header
pub fn read_volume_with_header<T: VoxelElement>(
    path: impl AsRef<Path>,
) -> Result<(NrrdHeader, Array3<T>)> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    let (header, voxels) = decode_array(&bytes)?;

    log::debug!(
        "read {} volume {:?} from {}",
        header.data_type,
        voxels.dim(),
        path.display()
    );
    Ok((header, voxels))
}

/// Read a 3D NRRD file of any supported sample type
pub fn read_volume_dyn(path: impl AsRef<Path>) -> Result<DynVolume> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    let (header, payload) = decode_volume(&bytes)?;
    let volume = DynVolume::from_payload(&header, payload)?;

    log::debug!(
        "read {} volume {:?} from {}",
        header.data_type,
        volume.shape(),
        path.display()
    );
    Ok(volume)
}

/// Parse only the header, stopping at the blank line that precedes the payload
pub fn read_header(path: impl AsRef<Path>) -> Result<NrrdHeader> {
    let mut reader = BufReader::new(File::open(path.as_ref())?);
    let mut head = Vec::new();
    loop {
        let start = head.len();
        let read = reader.read_until(b'\n', &mut head)?;
        let line = &head[start..];
        if read == 0 || line == b"\n" || line == b"\r\n" {
            break;
        }
    }
    let (header, _) = NrrdHeader::parse(&head)?;
    Ok(header)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NrrdError;
    use crate::types::{DataType, Encoding};
    use ndarray::{Array, ShapeBuilder};
    use tempfile::TempDir;

    fn metadata() -> VolumeMetadata {
        VolumeMetadata::new(
            [-50.0, 20.0, 7.5],
            [1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            [0.5, 0.5],
            2.0,
        )
    }

    #[test]
    fn test_encode_decode_array() {
        let voxels = Array::from_shape_fn((2, 3, 4), |(z, y, x)| (z * 100 + y * 10 + x) as i32);
        let bytes = encode_array(&voxels, &metadata(), &WriteOptions::default()).unwrap();
        let (header, decoded) = decode_array::<i32>(&bytes).unwrap();
        assert_eq!(header.sizes, vec![4, 3, 2]);
        assert_eq!(decoded, voxels);
    }

    #[test]
    fn test_fortran_layout_written_in_logical_order() {
        let mut voxels = Array::zeros((2, 2, 3).f());
        for ((z, y, x), v) in voxels.indexed_iter_mut() {
            *v = (z * 6 + y * 3 + x) as u8;
        }
        let bytes = encode_array(&voxels, &metadata(), &WriteOptions::default()).unwrap();
        let (_, payload) = decode_volume(&bytes).unwrap();
        assert_eq!(payload, (0u8..12).collect::<Vec<_>>().as_slice());
    }

    #[test]
    fn test_write_and_read_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("volume.nrrd");
        let voxels = Array::from_shape_fn((3, 2, 2), |(z, y, x)| z as f32 - 0.5 * y as f32 + x as f32);

        write_volume(&path, &voxels, &metadata()).unwrap();
        assert_eq!(read_volume::<f32>(&path).unwrap(), voxels);

        let header = read_header(&path).unwrap();
        assert_eq!(header.data_type, DataType::F32);
        assert_eq!(header.space_origin, Some(vec![-50.0, 20.0, 7.5]));
    }

    #[test]
    fn test_read_header_stops_before_payload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("volume.nrrd");
        // payload bytes spell out a bogus header line
        let voxels = Array::from_shape_vec((1, 1, 4), b"x:\n\n".to_vec()).unwrap();
        write_volume(&path, &voxels, &metadata()).unwrap();
        let header = read_header(&path).unwrap();
        assert_eq!(header.sizes, vec![4, 1, 1]);
    }

    #[test]
    fn test_ascii_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("volume.nrrd");
        let voxels = Array::from_shape_fn((2, 2, 2), |(z, y, x)| (z + y + x) as u16);
        let options = WriteOptions::new().with_encoding(Encoding::Ascii);

        write_volume_with_options(&path, &voxels, &metadata(), &options).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("encoding: ascii\n"));
        assert!(!text.contains("endian"));
        assert!(text.ends_with("\n\n0 1\n1 2\n1 2\n2 3\n"));

        assert_eq!(read_volume::<u16>(&path).unwrap(), voxels);
    }

    #[test]
    fn test_read_wrong_type() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("volume.nrrd");
        write_volume(&path, &Array3::<u8>::zeros((1, 1, 1)), &metadata()).unwrap();
        assert!(matches!(
            read_volume::<i16>(&path),
            Err(NrrdError::TypeMismatch { .. })
        ));
        assert_eq!(read_volume_dyn(&path).unwrap().data_type(), DataType::U8);
    }

    #[test]
    fn test_read_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = read_volume::<u8>(dir.path().join("absent.nrrd")).unwrap_err();
        assert!(matches!(err, NrrdError::Io(_)));
    }
}
