use thiserror::Error;

/// Top-level error type shared by secondbrain crates.
#[derive(Error, Debug)]
pub enum BrainError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<::config::ConfigError> for BrainError {
    fn from(e: ::config::ConfigError) -> Self {
        BrainError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BrainError>;
