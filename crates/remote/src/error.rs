//! Failure taxonomy of the remote state contract.

use thiserror::Error;

/// Errors surfaced by `RemoteStateClient` implementations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RemoteError {
    #[error("not signed in")]
    Unauthenticated,

    #[error("already enrolled in this course")]
    AlreadyEnrolled,

    #[error("network error: {0}")]
    Network(String),

    #[error("server responded with status {0}")]
    Status(u16),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("invalid client configuration: {0}")]
    InvalidConfig(String),
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RemoteError::MalformedResponse(err.to_string())
        } else {
            RemoteError::Network(err.to_string())
        }
    }
}
