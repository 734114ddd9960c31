//! DICOM-style acquisition geometry and write options

use crate::error::{NrrdError, Result};
use crate::geometry::{self, Matrix3, Vec3};
use crate::header::NrrdHeader;
use crate::types::{Encoding, Endian};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Geometry of a scanned volume, as found in a DICOM series
///
/// Field names serialize in DICOM attribute style (`imagePosition`,
/// `imageOrientation`, ...), so a JSON record with a missing or malformed key
/// fails here instead of during header construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeMetadata {
    /// World coordinate of the first voxel
    pub image_position: Vec3,

    /// Row direction cosines `[0..3]` followed by column direction cosines `[3..6]`
    pub image_orientation: [f64; 6],

    /// Physical voxel size along the row and column axes
    pub pixel_spacing: [f64; 2],

    /// Physical spacing between slices
    pub slice_thickness: f64,
}

impl VolumeMetadata {
    pub fn new(
        image_position: Vec3,
        image_orientation: [f64; 6],
        pixel_spacing: [f64; 2],
        slice_thickness: f64,
    ) -> Self {
        Self {
            image_position,
            image_orientation,
            pixel_spacing,
            slice_thickness,
        }
    }

    /// Parse from a JSON record
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Direction of increasing column index
    pub fn row_direction(&self) -> Vec3 {
        [
            self.image_orientation[0],
            self.image_orientation[1],
            self.image_orientation[2],
        ]
    }

    /// Direction of increasing row index
    pub fn column_direction(&self) -> Vec3 {
        [
            self.image_orientation[3],
            self.image_orientation[4],
            self.image_orientation[5],
        ]
    }

    /// Unscaled through-plane direction, `row x column`
    pub fn slice_direction(&self) -> Vec3 {
        geometry::cross(self.row_direction(), self.column_direction())
    }

    pub fn space_directions(&self) -> Matrix3 {
        geometry::space_directions(self)
    }

    pub fn space_origin(&self) -> Vec3 {
        geometry::space_origin(self)
    }

    /// Opt-in sanity check: both orientation vectors unit length and mutually
    /// orthogonal within `tolerance`. Writing never calls this.
    pub fn is_orthonormal(&self, tolerance: f64) -> bool {
        let row = self.row_direction();
        let col = self.column_direction();
        (geometry::norm(row) - 1.0).abs() <= tolerance
            && (geometry::norm(col) - 1.0).abs() <= tolerance
            && geometry::dot(row, col).abs() <= tolerance
    }

    /// Recover acquisition geometry from a 3D spatial header.
    ///
    /// Spacings are the lengths of the direction rows, orientation is the unit
    /// vectors of rows 0 and 1, position is the space origin.
    pub fn from_header(header: &NrrdHeader) -> Result<Self> {
        let origin = header
            .space_origin
            .as_ref()
            .ok_or_else(|| NrrdError::MissingField("space origin".to_string()))?;
        let directions: Vec<Vec3> = header
            .space_directions
            .iter()
            .flatten()
            .map(|row| to_vec3("space directions", row))
            .collect::<Result<_>>()?;

        if directions.len() != 3 {
            return Err(NrrdError::ShapeMismatch(format!(
                "expected 3 spatial axes, found {}",
                directions.len()
            )));
        }

        let row_dir = geometry::normalize(directions[0]);
        let col_dir = geometry::normalize(directions[1]);

        Ok(Self {
            image_position: to_vec3("space origin", origin)?,
            image_orientation: [
                row_dir[0], row_dir[1], row_dir[2], col_dir[0], col_dir[1], col_dir[2],
            ],
            pixel_spacing: [geometry::norm(directions[0]), geometry::norm(directions[1])],
            slice_thickness: geometry::norm(directions[2]),
        })
    }
}

fn to_vec3(field: &str, values: &[f64]) -> Result<Vec3> {
    match values {
        [x, y, z] => Ok([*x, *y, *z]),
        _ => Err(NrrdError::invalid_value(field, format!("{:?}", values))),
    }
}

/// Options controlling how a volume is serialized
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WriteOptions {
    /// Payload encoding
    pub encoding: Encoding,

    /// Byte order of raw payloads
    pub endian: Endian,

    /// Free-text `#` comment lines
    pub comments: Vec<String>,

    /// Value of the `content:` field
    pub content: Option<String>,

    /// Free `key:=value` pairs
    pub key_values: BTreeMap<String, String>,
}

impl WriteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set payload encoding
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Set byte order
    pub fn with_endian(mut self, endian: Endian) -> Self {
        self.endian = endian;
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comments.push(comment.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Add a free key/value pair
    pub fn with_key_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.key_values.insert(key.into(), value.into());
        self
    }
}
