//! Error types for the Health API client.

use thiserror::Error;

/// Errors that can occur when talking to the Health API.
///
/// `Clone` so the poller can keep the last error in its shared state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// The server could not be reached.
    #[error("connection failed: {0}")]
    Connection(String),

    /// No response within the request timeout.
    #[error("request timed out")]
    Timeout,

    /// The server answered with a non-2xx status.
    #[error("API returned status {0}")]
    Status(u16),

    /// The body was not JSON, or not a shape we understand.
    #[error("failed to parse response: {0}")]
    Parse(String),

    /// A POST was answered with `{"success": false}`.
    #[error("request rejected: {0}")]
    Rejected(String),

    /// A local replay file could not be read.
    #[error("read error: {0}")]
    Io(String),

    /// The request was refused before it was sent.
    #[error("invalid request: {0}")]
    Invalid(String),

    /// This client does not implement the endpoint.
    #[error("not supported: {0}")]
    Unsupported(&'static str),
}

impl ApiError {
    /// Short label for the status bar.
    pub fn short(&self) -> String {
        match self {
            ApiError::Connection(_) => "API unreachable".to_string(),
            ApiError::Timeout => "API timed out".to_string(),
            ApiError::Status(code) => format!("API returned {}", code),
            ApiError::Parse(_) => "Malformed API response".to_string(),
            ApiError::Io(_) => "Replay file unreadable".to_string(),
            ApiError::Rejected(msg) | ApiError::Invalid(msg) => msg.clone(),
            ApiError::Unsupported(what) => format!("{} not supported", what),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_connect() {
            ApiError::Connection(err.to_string())
        } else if err.is_decode() {
            ApiError::Parse(err.to_string())
        } else if let Some(status) = err.status() {
            ApiError::Status(status.as_u16())
        } else {
            ApiError::Connection(err.to_string())
        }
    }
}

impl From<crate::data::NormalizeError> for ApiError {
    fn from(err: crate::data::NormalizeError) -> Self {
        ApiError::Parse(err.to_string())
    }
}
