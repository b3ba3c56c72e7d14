//! Error types for Dawr

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    // Rule collection errors
    #[error("A rule with fingerprint '{0}' already exists")]
    DuplicateRule(String),

    #[error("No rule with fingerprint '{0}' exists")]
    RuleNotFound(String),

    // Validation errors
    #[error("Unknown storage class: {0}")]
    UnknownStorageClass(String),

    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Missing required key '{0}'")]
    MissingKey(String),

    // Declaration document errors
    #[error("Malformed document '{key}': {message}")]
    MalformedDocument { key: String, message: String },

    // Storage backend errors
    #[error("Storage backend error: {0}")]
    Storage(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn malformed_document(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::MalformedDocument {
            key: key.into(),
            message: message.into(),
        }
    }
}
