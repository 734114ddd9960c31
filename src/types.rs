//! Core NRRD field types

use crate::error::{NrrdError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sample types supported in NRRD payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum DataType {
    /// Signed 8-bit integer
    I8 = 0,
    /// Unsigned 8-bit integer
    U8 = 1,
    /// Signed 16-bit integer
    I16 = 2,
    /// Unsigned 16-bit integer
    U16 = 3,
    /// Signed 32-bit integer
    I32 = 4,
    /// Unsigned 32-bit integer
    U32 = 5,
    /// Signed 64-bit integer
    I64 = 6,
    /// Unsigned 64-bit integer
    U64 = 7,
    /// 32-bit floating point
    F32 = 8,
    /// 64-bit floating point
    F64 = 9,
}

impl DataType {
    /// Size in bytes of this data type
    pub fn size_in_bytes(&self) -> usize {
        match self {
            DataType::I8 | DataType::U8 => 1,
            DataType::I16 | DataType::U16 => 2,
            DataType::I32 | DataType::U32 | DataType::F32 => 4,
            DataType::I64 | DataType::U64 | DataType::F64 => 8,
        }
    }

    /// Check if this is a floating point type
    pub fn is_float(&self) -> bool {
        matches!(self, DataType::F32 | DataType::F64)
    }

    /// Check if this is an integer type
    pub fn is_integer(&self) -> bool {
        !self.is_float()
    }

    /// Canonical name written in the `type:` field
    pub fn nrrd_name(&self) -> &'static str {
        match self {
            DataType::I8 => "int8",
            DataType::U8 => "uint8",
            DataType::I16 => "int16",
            DataType::U16 => "uint16",
            DataType::I32 => "int32",
            DataType::U32 => "uint32",
            DataType::I64 => "int64",
            DataType::U64 => "uint64",
            DataType::F32 => "float",
            DataType::F64 => "double",
        }
    }

    /// Parse any of the type spellings NRRD allows
    pub fn from_nrrd_name(name: &str) -> Option<Self> {
        let normalized = name.split_whitespace().collect::<Vec<_>>().join(" ");
        match normalized.as_str() {
            "signed char" | "int8" | "int8_t" => Some(DataType::I8),
            "uchar" | "unsigned char" | "uint8" | "uint8_t" => Some(DataType::U8),
            "short" | "short int" | "signed short" | "signed short int" | "int16"
            | "int16_t" => Some(DataType::I16),
            "ushort" | "unsigned short" | "unsigned short int" | "uint16" | "uint16_t" => {
                Some(DataType::U16)
            }
            "int" | "signed int" | "int32" | "int32_t" => Some(DataType::I32),
            "uint" | "unsigned int" | "uint32" | "uint32_t" => Some(DataType::U32),
            "longlong" | "long long" | "long long int" | "signed long long"
            | "signed long long int" | "int64" | "int64_t" => Some(DataType::I64),
            "ulonglong" | "unsigned long long" | "unsigned long long int" | "uint64"
            | "uint64_t" => Some(DataType::U64),
            "float" => Some(DataType::F32),
            "double" => Some(DataType::F64),
            _ => None,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.nrrd_name())
    }
}

/// Payload encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// Binary samples in the declared byte order
    #[default]
    Raw,
    /// Whitespace separated decimal samples
    Ascii,
}

impl Encoding {
    pub fn nrrd_name(&self) -> &'static str {
        match self {
            Encoding::Raw => "raw",
            Encoding::Ascii => "ascii",
        }
    }

    /// Parse an encoding name; compressed and hex payloads are recognized but refused
    pub fn from_nrrd_name(name: &str) -> Result<Self> {
        let lower = name.trim().to_ascii_lowercase();
        match lower.as_str() {
            "raw" => Ok(Encoding::Raw),
            "ascii" | "text" | "txt" => Ok(Encoding::Ascii),
            "hex" | "gzip" | "gz" | "bzip2" | "bz2" | "zstd" => {
                Err(NrrdError::UnsupportedEncoding(lower))
            }
            _ => Err(NrrdError::invalid_value("encoding", name.trim())),
        }
    }

    /// Whether the byte order of the payload matters
    pub fn is_binary(&self) -> bool {
        matches!(self, Encoding::Raw)
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.nrrd_name())
    }
}

/// Byte order of binary payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endian {
    #[default]
    Little,
    Big,
}

impl Endian {
    pub fn nrrd_name(&self) -> &'static str {
        match self {
            Endian::Little => "little",
            Endian::Big => "big",
        }
    }

    pub fn from_nrrd_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "little" => Some(Endian::Little),
            "big" => Some(Endian::Big),
            _ => None,
        }
    }

    /// Byte order of the running machine
    pub fn native() -> Self {
        if cfg!(target_endian = "big") {
            Endian::Big
        } else {
            Endian::Little
        }
    }
}

/// Per-axis kind tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AxisKind {
    Domain,
    Space,
    Time,
    List,
    Point,
    Vector,
    CovariantVector,
    Normal,
    Stub,
    Scalar,
    Complex,
    TwoVector,
    ThreeColor,
    RgbColor,
    HsvColor,
    XyzColor,
    FourColor,
    RgbaColor,
    ThreeVector,
    ThreeGradient,
    ThreeNormal,
    FourVector,
    Quaternion,
    SymmetricMatrix2d,
    MaskedSymmetricMatrix2d,
    Matrix2d,
    MaskedMatrix2d,
    SymmetricMatrix3d,
    MaskedSymmetricMatrix3d,
    Matrix3d,
    MaskedMatrix3d,
    Unknown,
}

impl AxisKind {
    const NAMES: [(AxisKind, &'static str); 32] = [
        (AxisKind::Domain, "domain"),
        (AxisKind::Space, "space"),
        (AxisKind::Time, "time"),
        (AxisKind::List, "list"),
        (AxisKind::Point, "point"),
        (AxisKind::Vector, "vector"),
        (AxisKind::CovariantVector, "covariant-vector"),
        (AxisKind::Normal, "normal"),
        (AxisKind::Stub, "stub"),
        (AxisKind::Scalar, "scalar"),
        (AxisKind::Complex, "complex"),
        (AxisKind::TwoVector, "2-vector"),
        (AxisKind::ThreeColor, "3-color"),
        (AxisKind::RgbColor, "rgb-color"),
        (AxisKind::HsvColor, "hsv-color"),
        (AxisKind::XyzColor, "xyz-color"),
        (AxisKind::FourColor, "4-color"),
        (AxisKind::RgbaColor, "rgba-color"),
        (AxisKind::ThreeVector, "3-vector"),
        (AxisKind::ThreeGradient, "3-gradient"),
        (AxisKind::ThreeNormal, "3-normal"),
        (AxisKind::FourVector, "4-vector"),
        (AxisKind::Quaternion, "quaternion"),
        (AxisKind::SymmetricMatrix2d, "2d-symmetric-matrix"),
        (AxisKind::MaskedSymmetricMatrix2d, "2d-masked-symmetric-matrix"),
        (AxisKind::Matrix2d, "2d-matrix"),
        (AxisKind::MaskedMatrix2d, "2d-masked-matrix"),
        (AxisKind::SymmetricMatrix3d, "3d-symmetric-matrix"),
        (AxisKind::MaskedSymmetricMatrix3d, "3d-masked-symmetric-matrix"),
        (AxisKind::Matrix3d, "3d-matrix"),
        (AxisKind::MaskedMatrix3d, "3d-masked-matrix"),
        (AxisKind::Unknown, "???"),
    ];

    pub fn nrrd_name(&self) -> &'static str {
        Self::NAMES
            .iter()
            .find(|(kind, _)| kind == self)
            .map(|(_, name)| *name)
            .unwrap_or("???")
    }

    /// Case-insensitive lookup; `none` is accepted as an alias for `???`
    pub fn from_nrrd_name(name: &str) -> Option<Self> {
        let lower = name.trim().to_ascii_lowercase();
        if lower == "none" {
            return Some(AxisKind::Unknown);
        }
        Self::NAMES
            .iter()
            .find(|(_, n)| *n == lower)
            .map(|(kind, _)| *kind)
    }

    /// Axis size this kind demands, if it fixes one
    pub fn expected_size(&self) -> Option<usize> {
        match self {
            AxisKind::Stub | AxisKind::Scalar => Some(1),
            AxisKind::Complex | AxisKind::TwoVector => Some(2),
            AxisKind::ThreeColor
            | AxisKind::RgbColor
            | AxisKind::HsvColor
            | AxisKind::XyzColor
            | AxisKind::ThreeVector
            | AxisKind::ThreeGradient
            | AxisKind::ThreeNormal
            | AxisKind::SymmetricMatrix2d => Some(3),
            AxisKind::FourColor
            | AxisKind::RgbaColor
            | AxisKind::FourVector
            | AxisKind::Quaternion
            | AxisKind::MaskedSymmetricMatrix2d
            | AxisKind::Matrix2d
            | AxisKind::MaskedMatrix2d => Some(4),
            AxisKind::SymmetricMatrix3d => Some(6),
            AxisKind::MaskedSymmetricMatrix3d => Some(7),
            AxisKind::Matrix3d => Some(9),
            AxisKind::MaskedMatrix3d => Some(10),
            _ => None,
        }
    }
}

impl fmt::Display for AxisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.nrrd_name())
    }
}

/// World coordinate systems
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Space {
    RightAnteriorSuperior,
    LeftAnteriorSuperior,
    LeftPosteriorSuperior,
    RightAnteriorSuperiorTime,
    LeftAnteriorSuperiorTime,
    LeftPosteriorSuperiorTime,
    ScannerXyz,
    ScannerXyzTime,
    RightHanded3d,
    LeftHanded3d,
    RightHanded3dTime,
    LeftHanded3dTime,
}

impl Space {
    pub fn nrrd_name(&self) -> &'static str {
        match self {
            Space::RightAnteriorSuperior => "right-anterior-superior",
            Space::LeftAnteriorSuperior => "left-anterior-superior",
            Space::LeftPosteriorSuperior => "left-posterior-superior",
            Space::RightAnteriorSuperiorTime => "right-anterior-superior-time",
            Space::LeftAnteriorSuperiorTime => "left-anterior-superior-time",
            Space::LeftPosteriorSuperiorTime => "left-posterior-superior-time",
            Space::ScannerXyz => "scanner-xyz",
            Space::ScannerXyzTime => "scanner-xyz-time",
            Space::RightHanded3d => "3d-right-handed",
            Space::LeftHanded3d => "3d-left-handed",
            Space::RightHanded3dTime => "3d-right-handed-time",
            Space::LeftHanded3dTime => "3d-left-handed-time",
        }
    }

    /// Accepts full names and the three/four letter abbreviations
    pub fn from_nrrd_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "right-anterior-superior" | "ras" => Some(Space::RightAnteriorSuperior),
            "left-anterior-superior" | "las" => Some(Space::LeftAnteriorSuperior),
            "left-posterior-superior" | "lps" => Some(Space::LeftPosteriorSuperior),
            "right-anterior-superior-time" | "rast" => Some(Space::RightAnteriorSuperiorTime),
            "left-anterior-superior-time" | "last" => Some(Space::LeftAnteriorSuperiorTime),
            "left-posterior-superior-time" | "lpst" => Some(Space::LeftPosteriorSuperiorTime),
            "scanner-xyz" => Some(Space::ScannerXyz),
            "scanner-xyz-time" => Some(Space::ScannerXyzTime),
            "3d-right-handed" => Some(Space::RightHanded3d),
            "3d-left-handed" => Some(Space::LeftHanded3d),
            "3d-right-handed-time" => Some(Space::RightHanded3dTime),
            "3d-left-handed-time" => Some(Space::LeftHanded3dTime),
            _ => None,
        }
    }

    /// Number of world coordinates this space has
    pub fn dimension(&self) -> usize {
        match self {
            Space::RightAnteriorSuperiorTime
            | Space::LeftAnteriorSuperiorTime
            | Space::LeftPosteriorSuperiorTime
            | Space::ScannerXyzTime
            | Space::RightHanded3dTime
            | Space::LeftHanded3dTime => 4,
            _ => 3,
        }
    }
}

impl fmt::Display for Space {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.nrrd_name())
    }
}

/// Sample centering along an axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Center {
    Cell,
    Node,
}

impl Center {
    pub fn nrrd_name(&self) -> &'static str {
        match self {
            Center::Cell => "cell",
            Center::Node => "node",
        }
    }

    pub fn from_nrrd_name(name: &str) -> Option<Self> {
        match name.trim() {
            "cell" => Some(Center::Cell),
            "node" => Some(Center::Node),
            _ => None,
        }
    }
}

/// Value range of a volume's samples
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }
}
