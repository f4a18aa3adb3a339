//! Gateway Error Types
//!
//! Only input errors and backend-query errors are meant to reach the HTTP
//! boundary. Cache faults are absorbed by the cache layer before they get here,
//! and moderation cannot fail.

use thiserror::Error;

/// Result type alias used across the crate.
pub type Result<T> = std::result::Result<T, GatewayError>;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// Query text was empty after trimming.
    #[error("invalid query parameter")]
    InvalidQuery,

    /// Request body could not be turned into a document.
    #[error("invalid request body: {0}")]
    InvalidDocument(String),

    /// Transport-level failure talking to the index (connect, timeout, reset).
    #[error("search backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Index answered with a non-success status.
    #[error("search backend returned {status}: {body}")]
    BackendStatus { status: u16, body: String },

    /// Index answered 2xx but the payload did not have the expected shape.
    #[error("failed to decode backend response: {0}")]
    BackendDecode(String),

    /// Cache store failure.
    #[error("cache error: {0}")]
    Cache(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl GatewayError {
    /// True for errors caused by the caller's input (mapped to 400).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            GatewayError::InvalidQuery | GatewayError::InvalidDocument(_)
        )
    }

    /// True for any failure originating in the index backend.
    #[must_use]
    pub fn is_backend_error(&self) -> bool {
        matches!(
            self,
            GatewayError::BackendUnavailable(_)
                | GatewayError::BackendStatus { .. }
                | GatewayError::BackendDecode(_)
        )
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            GatewayError::BackendDecode(error.to_string())
        } else {
            GatewayError::BackendUnavailable(error.to_string())
        }
    }
}

impl From<redis::RedisError> for GatewayError {
    fn from(error: redis::RedisError) -> Self {
        GatewayError::Cache(error.to_string())
    }
}
