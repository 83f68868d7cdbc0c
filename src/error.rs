//! Error types for the delivery duration pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, EtaError>;

/// Main error type for the pipeline
#[derive(Error, Debug)]
pub enum EtaError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Schema error: required column missing: {0}")]
    MissingColumn(String),

    #[error("Schema drift: {0}")]
    SchemaDrift(String),

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Alignment error: {0}")]
    AlignmentError(String),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<polars::error::PolarsError> for EtaError {
    fn from(err: polars::error::PolarsError) -> Self {
        EtaError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for EtaError {
    fn from(err: serde_json::Error) -> Self {
        EtaError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for EtaError {
    fn from(err: ndarray::ShapeError) -> Self {
        EtaError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EtaError::DataError("bad column".to_string());
        assert_eq!(err.to_string(), "Data error: bad column");
    }

    #[test]
    fn test_missing_column_display() {
        let err = EtaError::MissingColumn("subtotal".to_string());
        assert!(err.to_string().contains("subtotal"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: EtaError = io_err.into();
        assert!(matches!(err, EtaError::IoError(_)));
    }
}
