//! Failure reasons for a single request.

use thiserror::Error;

/// Why a request produced no payload.
///
/// Timeouts get their own variant so callers can tell a slow server apart
/// from one that refused the connection.
#[derive(Debug, Error)]
pub enum RequestError {
    /// The path could not be turned into an absolute URL.
    #[error("invalid request url: {0}")]
    InvalidUrl(String),

    /// The request did not settle within the client timeout.
    #[error("request timed out")]
    Timeout,

    /// Connection, TLS, or body encoding failure.
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body was not valid JSON.
    #[error("failed to decode response body: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for RequestError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RequestError::Timeout
        } else {
            RequestError::Transport(err)
        }
    }
}

impl RequestError {
    /// Short machine-friendly label, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            RequestError::InvalidUrl(_) => "invalid_url",
            RequestError::Timeout => "timeout",
            RequestError::Transport(_) => "transport",
            RequestError::Status { .. } => "status",
            RequestError::Decode(_) => "decode",
        }
    }
}
