//! Error types for the availability pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while syncing feeds or loading records.
#[derive(Error, Debug)]
pub enum SuiteCalError {
    #[error("Missing feed configuration at {0}")]
    ConfigMissing(PathBuf),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Request to {url} failed with status {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("Feed at {0} redirected more than once")]
    TooManyRedirects(String),

    #[error("Feed at {0} redirected without a Location header")]
    MissingLocation(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Invalid suite id '{0}'")]
    InvalidSuiteId(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<reqwest::Error> for SuiteCalError {
    fn from(e: reqwest::Error) -> Self {
        SuiteCalError::Http(e.to_string())
    }
}

impl From<serde_json::Error> for SuiteCalError {
    fn from(e: serde_json::Error) -> Self {
        SuiteCalError::Serialization(e.to_string())
    }
}

/// Result type alias for availability operations.
pub type SuiteCalResult<T> = Result<T, SuiteCalError>;
