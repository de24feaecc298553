//! Error types for tc-qa-report

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading worksheets or writing reports
#[derive(Debug, Error)]
pub enum Error {
    /// IO error (from std::io)
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// IO error with custom message
    #[error("IO error: {0}")]
    Io(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Reconciliation input error
    #[error(transparent)]
    Recon(#[from] tc_qa_recon::Error),

    /// Worksheet does not exist in the workbook
    #[error("Worksheet not found: {0}")]
    WorksheetNotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),
}
