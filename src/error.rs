//! Error types for tcptune.

use std::io;

use thiserror::Error;

/// Result type alias for tcptune operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for tcptune.
#[derive(Error, Debug)]
pub enum Error {
    // Input errors
    #[error("invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    // Advisory service errors
    #[error("advisor error: {0}")]
    Advisor(#[from] AdvisorError),

    // Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Failures of the hosted advisory-text service.
///
/// These never reach the end user directly: [`crate::advisor::Advisor`]
/// logs them and substitutes a fixed fallback message.
#[derive(Error, Debug)]
pub enum AdvisorError {
    #[error("advisor disabled in configuration")]
    Disabled,

    #[error("no API key configured (set GEMINI_API_KEY or advisor.api_key)")]
    MissingApiKey,

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    Decode(String),

    #[error("empty response")]
    EmptyResponse,

    #[error("request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("request cancelled")]
    Cancelled,
}

impl AdvisorError {
    /// Check if the failure is transient (worth retrying later).
    pub fn is_retryable(&self) -> bool {
        match self {
            AdvisorError::Http(_) | AdvisorError::Timeout(_) => true,
            AdvisorError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for AdvisorError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            AdvisorError::Decode(e.to_string())
        } else {
            AdvisorError::Http(e.to_string())
        }
    }
}

impl Error {
    /// Shorthand for an [`Error::InvalidInput`].
    pub fn invalid_input(field: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}
