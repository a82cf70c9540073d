//! Error types for node input loading and validation.

use thiserror::Error;

/// Errors returned while loading or reading node inputs.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading an input file failed.
    #[error("failed to read node inputs: {0}")]
    ReadFailed(#[from] std::io::Error),
    /// Parsing JSON5 contents failed.
    #[error("failed to parse node inputs: {0}")]
    ParseFailed(#[from] json5::Error),
    /// A specific field failed validation.
    #[error("invalid input at {path}: {message}")]
    InvalidField { path: String, message: String },
    /// Generic validation failure.
    #[error("invalid node inputs: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub(crate) fn field(path: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::InvalidField {
            path: path.into(),
            message: message.into(),
        }
    }
}
