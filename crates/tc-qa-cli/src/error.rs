//! Error types for the tc-qa CLI

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that end a CLI run
#[derive(Debug, Error)]
pub enum CliError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file is not valid YAML
    #[error("Config error: {0}")]
    Config(#[from] serde_yaml::Error),

    /// Mapping file or reconciliation input error
    #[error(transparent)]
    Recon(#[from] tc_qa_recon::Error),

    /// Workbook error
    #[error(transparent)]
    Report(#[from] tc_qa_report::Error),

    /// Issue export error
    #[error(transparent)]
    Issues(#[from] tc_qa_issues::Error),
}
