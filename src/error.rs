//! Error type shared by the engine and the harness.

use thiserror::Error;

/// Every fallible operation in the crate returns this error.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl HarnessError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn shape(msg: impl Into<String>) -> Self {
        Self::ShapeMismatch(msg.into())
    }

    pub fn dataset(msg: impl Into<String>) -> Self {
        Self::Dataset(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, HarnessError>;
