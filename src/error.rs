//! Error type for calls against the gradebook APIs.

use thiserror::Error;

/// Failure of a single API call.
///
/// Controllers branch on [`ApiError::is_auth_failure`] to decide whether the
/// stored token must be discarded; every other variant is shown to the user.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("not authorized (HTTP {status}); the Canvas token was rejected")]
    Unauthorized { status: u16 },
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed response: {0}")]
    Decode(String),
    #[error("invalid URL `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("invalid credential: {0}")]
    InvalidCredential(String),
}

impl ApiError {
    /// `true` for 401/403 responses.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }
}
