//! Error types for the reviewflow pipeline
//!
//! Structured error definitions with thiserror; binaries propagate through
//! anyhow at their boundaries.

use thiserror::Error;

/// Main error type for reviewflow operations
#[derive(Error, Debug)]
pub enum ReviewFlowError {
    /// CSV parsing or writing failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A required input column is missing or malformed
    #[error("Missing or malformed column '{column}' in {file}")]
    MissingColumn { column: String, file: String },

    /// Classifier training failed (empty labeled set, empty vocabulary)
    #[error("Training error: {0}")]
    Training(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

/// Result type alias for reviewflow operations
pub type Result<T> = std::result::Result<T, ReviewFlowError>;

/// Convert anyhow::Error to ReviewFlowError
impl From<anyhow::Error> for ReviewFlowError {
    fn from(err: anyhow::Error) -> Self {
        ReviewFlowError::Other(err.to_string())
    }
}
