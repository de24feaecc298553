//! Error types for tc-qa-recon

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading reconciliation inputs
///
/// Data-quality problems (malformed rows, naming defects) are never errors;
/// they are collected as report content.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Definition file is not a JSON object keyed by test case id
    #[error("Definition parse error: {0}")]
    DefinitionParse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition_parse_display() {
        let err = Error::DefinitionParse("top-level value is an array".to_string());
        assert!(err.to_string().contains("Definition parse error"));
        assert!(err.to_string().contains("array"));
    }

    #[test]
    fn test_validation_error() {
        let err = Error::Validation("missing column".to_string());
        assert!(err.to_string().contains("missing column"));
    }

    #[test]
    fn test_io_error_from() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "mapping.json");
        let err: Error = io.into();
        assert!(err.to_string().contains("mapping.json"));
    }
}
