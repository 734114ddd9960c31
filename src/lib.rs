//! nrrd-volume - 3D voxel volumes as NRRD files
//!
//! Converts an in-memory voxel array plus DICOM-style acquisition geometry
//! (image position, orientation cosines, pixel spacing, slice thickness) into a
//! spatial NRRD header and raw payload, and reads such files back.
//!
//! # Geometry
//!
//! The header origin is the image position, unchanged. The `space directions`
//! matrix has one row per voxel axis:
//!
//! - row 0: `pixel_spacing[0] * row_cosines`
//! - row 1: `pixel_spacing[1] * column_cosines`
//! - row 2: `slice_thickness * (row_cosines x column_cosines)`
//!
//! Orientation vectors are accepted as given; see
//! [`VolumeMetadata::is_orthonormal`] for an opt-in check.
//!
//! # Example
//!
//! ```rust,no_run
//! use ndarray::Array3;
//! use nrrd_volume::{read_volume, write_volume, VolumeMetadata};
//!
//! # fn example() -> nrrd_volume::Result<()> {
//! let metadata = VolumeMetadata::new(
//!     [0.0, 0.0, 0.0],
//!     [1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
//!     [2.0, 2.0],
//!     5.0,
//! );
//! // (slices, rows, columns)
//! let voxels = Array3::<i16>::zeros((40, 256, 256));
//! write_volume("ct.nrrd", &voxels, &metadata)?;
//!
//! let back: Array3<i16> = read_volume("ct.nrrd")?;
//! assert_eq!(back, voxels);
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod element;
pub mod error;
pub mod geometry;
pub mod header;
pub mod io;
pub mod metadata;
pub mod types;
pub mod volume;

// Re-exports
pub use codec::{decode_volume, encode_volume, NrrdCodec, VolumeCodec};
pub use element::VoxelElement;
pub use error::{NrrdError, Result};
pub use header::NrrdHeader;
pub use io::{
    decode_array, encode_array, read_header, read_volume, read_volume_dyn,
    read_volume_with_header, write_volume, write_volume_with_options,
};
pub use metadata::{VolumeMetadata, WriteOptions};
pub use types::{AxisKind, Center, DataType, Encoding, Endian, Space, ValueRange};
pub use volume::DynVolume;

/// Version of this crate
pub const NRRD_VOLUME_VERSION: &str = env!("CARGO_PKG_VERSION");
