//! End-to-end tests for writing and reading NRRD volumes
//!
//! Fixtures under `test-data/` were written by hand, independently of this crate's writer.

use ndarray::{Array, Array3};
use nrrd_volume::{
    read_header, read_volume, read_volume_dyn, read_volume_with_header, write_volume,
    write_volume_with_options, AxisKind, DataType, DynVolume, Encoding, Endian, NrrdError,
    Space, ValueRange, VolumeMetadata, WriteOptions,
};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Get the path to test data directory
fn test_data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test-data")
}

fn axial_metadata() -> VolumeMetadata {
    VolumeMetadata::new(
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
        [2.0, 2.0],
        5.0,
    )
}

#[test]
fn test_axial_header_on_disk() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("axial.nrrd");
    let voxels = Array3::<u8>::zeros((1, 1, 1));

    write_volume(&path, &voxels, &axial_metadata()).unwrap();

    let header = read_header(&path).unwrap();
    assert_eq!(header.dimension, 3);
    assert_eq!(header.kinds, vec![AxisKind::Domain; 3]);
    assert_eq!(header.space, Some(Space::LeftPosteriorSuperior));
    assert_eq!(header.encoding, Encoding::Raw);
    assert_eq!(header.space_origin, Some(vec![0.0, 0.0, 0.0]));
    assert_eq!(
        header.direction_matrix(),
        Some([[2.0, 0.0, 0.0], [0.0, 2.0, 0.0], [0.0, 0.0, 5.0]])
    );

    let expected = "NRRD0004\n\
                    # Complete NRRD file format specification at:\n\
                    # http://teem.sourceforge.net/nrrd/format.html\n\
                    type: uint8\n\
                    dimension: 3\n\
                    space: left-posterior-superior\n\
                    sizes: 1 1 1\n\
                    space directions: (2,0,0) (0,2,0) (0,0,5)\n\
                    kinds: domain domain domain\n\
                    encoding: raw\n\
                    space origin: (0,0,0)\n\
                    \n\
                    \0";
    assert_eq!(fs::read(&path).unwrap(), expected.as_bytes());
}

#[test]
fn test_sequential_cube_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cube.nrrd");
    let voxels = Array::from_shape_vec((2, 2, 2), (0..8).collect::<Vec<i64>>()).unwrap();

    write_volume(&path, &voxels, &axial_metadata()).unwrap();
    let back: Array3<i64> = read_volume(&path).unwrap();

    assert_eq!(back.dim(), (2, 2, 2));
    assert_eq!(back, voxels);
    assert_eq!(back[[1, 0, 1]], 5);
}

#[test]
fn test_unwritable_path_leaves_no_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("no-such-dir").join("volume.nrrd");
    let voxels = Array3::<f32>::ones((2, 2, 2));

    let err = write_volume(&path, &voxels, &axial_metadata()).unwrap_err();
    assert!(matches!(err, NrrdError::Io(_)));
    assert!(!path.exists());
}

#[test]
fn test_oblique_geometry_round_trips_through_header() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("oblique.nrrd");
    let metadata = VolumeMetadata::new(
        [-112.3, -98.75, 41.0],
        [0.6, 0.8, 0.0, 0.0, 0.0, -1.0],
        [0.9, 1.1],
        3.3,
    );
    let voxels = Array::from_shape_fn((4, 3, 2), |(z, y, x)| (z * 6 + y * 2 + x) as i16 - 10);

    write_volume(&path, &voxels, &metadata).unwrap();
    let (header, back) = read_volume_with_header::<i16>(&path).unwrap();
    assert_eq!(back, voxels);

    // origin passes through untouched
    assert_eq!(header.space_origin, Some(metadata.image_position.to_vec()));

    // the third row is the cross product of the unscaled cosines, scaled by thickness
    let directions = header.direction_matrix().unwrap();
    let cross = metadata.slice_direction();
    for axis in 0..3 {
        assert!((directions[2][axis] - cross[axis] * 3.3).abs() < 1e-12);
    }
    assert_eq!(directions, metadata.space_directions());

    let recovered = VolumeMetadata::from_header(&header).unwrap();
    assert_eq!(recovered.image_position, metadata.image_position);
    for (a, b) in recovered
        .image_orientation
        .iter()
        .zip(metadata.image_orientation.iter())
    {
        assert!((a - b).abs() < 1e-12);
    }
    assert!((recovered.pixel_spacing[0] - 0.9).abs() < 1e-12);
    assert!((recovered.pixel_spacing[1] - 1.1).abs() < 1e-12);
    assert!((recovered.slice_thickness - 3.3).abs() < 1e-12);
}

#[test]
fn test_overwrite_existing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("volume.nrrd");

    write_volume(&path, &Array3::<f64>::from_elem((3, 3, 3), 1.5), &axial_metadata()).unwrap();
    let smaller = Array3::<u8>::from_elem((1, 2, 1), 9);
    write_volume(&path, &smaller, &axial_metadata()).unwrap();

    assert_eq!(read_volume::<u8>(&path).unwrap(), smaller);
}

#[test]
fn test_big_endian_options() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("big.nrrd");
    let voxels = Array::from_shape_fn((2, 2, 2), |(z, y, x)| (z * 4 + y * 2 + x) as u32 * 1000);
    let options = WriteOptions::new()
        .with_endian(Endian::Big)
        .with_content("synthetic ramp")
        .with_comment("exported for review")
        .with_key_value("modality", "CT");

    write_volume_with_options(&path, &voxels, &axial_metadata(), &options).unwrap();
    let (header, back) = read_volume_with_header::<u32>(&path).unwrap();
    assert_eq!(back, voxels);
    assert_eq!(header.endian, Some(Endian::Big));
    assert_eq!(header.content.as_deref(), Some("synthetic ramp"));
    assert!(header.comments.iter().any(|c| c == "exported for review"));
    assert_eq!(header.key_values.get("modality").map(String::as_str), Some("CT"));
}

#[test]
fn test_read_ascii_fixture() {
    let path = test_data_dir().join("ct_ascii.nrrd");
    let voxels: Array3<i16> = read_volume(&path).unwrap();
    assert_eq!(voxels.dim(), (2, 2, 3));
    assert_eq!(voxels[[0, 0, 0]], -1000);
    assert_eq!(voxels[[0, 1, 2]], 30);
    assert_eq!(voxels[[1, 1, 0]], 70);

    let header = read_header(&path).unwrap();
    assert_eq!(header.data_type, DataType::I16);
    assert_eq!(header.comments.len(), 1);
    let metadata = VolumeMetadata::from_header(&header).unwrap();
    assert_eq!(metadata.image_position, [-10.0, -20.0, 30.0]);
    assert_eq!(metadata.pixel_spacing, [0.5, 0.5]);
    assert_eq!(metadata.slice_thickness, 2.0);
    assert!(metadata.is_orthonormal(1e-9));
}

#[test]
fn test_read_big_endian_fixture() {
    let path = test_data_dir().join("mr_big_endian.nrrd");
    let volume = read_volume_dyn(&path).unwrap();
    assert_eq!(volume.data_type(), DataType::U16);
    assert_eq!(volume.shape(), [1, 2, 2]);
    assert_eq!(volume.value_range(), Some(ValueRange::new(1.0, 258.0)));

    match volume {
        DynVolume::U16(array) => {
            assert_eq!(array.into_raw_vec_and_offset().0, vec![1, 2, 3, 258]);
        }
        other => panic!("unexpected variant {:?}", other.data_type()),
    }

    let header = read_header(&path).unwrap();
    assert_eq!(header.space, Some(Space::RightAnteriorSuperior));
    assert_eq!(header.key_values.get("modality").map(String::as_str), Some("MR"));
}

#[test]
fn test_malformed_files() {
    let dir = TempDir::new().unwrap();

    let not_nrrd = dir.path().join("image.png");
    fs::write(&not_nrrd, b"\x89PNG\r\n\x1a\n\0\0\0\0").unwrap();
    assert!(matches!(
        read_volume::<u8>(&not_nrrd),
        Err(NrrdError::InvalidFormat(_))
    ));

    let truncated = dir.path().join("truncated.nrrd");
    let mut bytes = fs::read(test_data_dir().join("mr_big_endian.nrrd")).unwrap();
    bytes.pop();
    fs::write(&truncated, &bytes).unwrap();
    let err = read_volume::<u16>(&truncated).unwrap_err();
    assert!(err.to_string().contains("inconsistent data buffer length"));

    let two_d = dir.path().join("slice.nrrd");
    fs::write(
        &two_d,
        b"NRRD0004\ntype: uint8\ndimension: 2\nsizes: 2 2\nencoding: raw\n\n\x01\x02\x03\x04",
    )
    .unwrap();
    assert!(matches!(
        read_volume::<u8>(&two_d),
        Err(NrrdError::ShapeMismatch(_))
    ));

    let huge = dir.path().join("huge.nrrd");
    fs::write(
        &huge,
        b"NRRD0004\ntype: uint8\ndimension: 3\nsizes: 4294967296 4294967296 2\nencoding: raw\n\n\x00",
    )
    .unwrap();
    assert!(matches!(
        read_volume::<u8>(&huge),
        Err(NrrdError::ShapeMismatch(_))
    ));
    assert!(matches!(
        read_volume_dyn(&huge),
        Err(NrrdError::ShapeMismatch(_))
    ));
}
