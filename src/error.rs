//! Error types for NRRD volume operations

use thiserror::Error;

/// Main error type for NRRD volume operations
#[derive(Error, Debug)]
pub enum NrrdError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid NRRD format: {0}")]
    InvalidFormat(String),

    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Unsupported data type: {0}")]
    UnsupportedType(String),

    #[error("Unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    #[error("Type mismatch: file holds {found}, requested {expected}")]
    TypeMismatch { expected: String, found: String },

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for field '{field}': {value}")]
    InvalidValue { field: String, value: String },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl NrrdError {
    pub(crate) fn invalid_value(field: &str, value: impl Into<String>) -> Self {
        NrrdError::InvalidValue {
            field: field.to_string(),
            value: value.into(),
        }
    }
}

/// Specialized Result type for NRRD volume operations
pub type Result<T> = std::result::Result<T, NrrdError>;

impl From<serde_json::Error> for NrrdError {
    fn from(err: serde_json::Error) -> Self {
        NrrdError::Serialization(err.to_string())
    }
}

impl From<ndarray::ShapeError> for NrrdError {
    fn from(err: ndarray::ShapeError) -> Self {
        NrrdError::ShapeMismatch(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: NrrdError = io.into();
        assert!(matches!(err, NrrdError::Io(_)));
        assert!(err.to_string().starts_with("IO error"));
    }

    #[test]
    fn test_type_mismatch_message() {
        let err = NrrdError::TypeMismatch {
            expected: "uint8".to_string(),
            found: "double".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Type mismatch: file holds double, requested uint8"
        );
    }
}
