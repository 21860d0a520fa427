//! Centralized error types for the shared library.
//!
//! Errors raised while building clients or handling payloads on behalf of
//! the integration tooling.

use thiserror::Error;

/// Common error type for platform operations.
#[derive(Error, Debug)]
pub enum PlatformError {
    /// HTTP client construction or request failed
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PlatformError {
    /// Create an invalid input error with the given message.
    #[must_use]
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an internal error with the given message.
    #[must_use]
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
