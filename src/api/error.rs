//! Error taxonomy for the directory API access layer

use thiserror::Error;

/// Errors produced by the directory API access layer.
///
/// Cancellation is represented as its own variant so callers can tell an
/// interrupted operation apart from a failed one.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The rate limiter was given a non-positive request budget.
    #[error("requests per second must be greater than zero")]
    InvalidRate,

    /// The token exchange was rejected or the token endpoint was unreachable.
    #[error("authentication failed: {reason}")]
    Auth { reason: String },

    /// The user endpoint answered with a failure status.
    #[error("remote API returned {status}: {message}")]
    Remote { status: u16, message: String },

    /// Transport-level failure while talking to the user endpoint.
    #[error(transparent)]
    Network(#[from] reqwest::Error),

    /// The request was rejected locally, before any network traffic.
    #[error("{0}")]
    Validation(String),

    /// The cancellation signal fired while the operation was in flight.
    #[error("operation canceled")]
    Canceled,
}

impl ApiError {
    /// Whether this error is a cancellation rather than a failure.
    pub fn is_canceled(&self) -> bool {
        matches!(self, ApiError::Canceled)
    }
}
