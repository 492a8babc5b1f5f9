//! Error types for the HTTP request gateway
//!
//! These never cross the public gateway boundary: the gateway logs them and
//! degrades to an empty JSON object. They exist so the failure modes stay
//! typed inside the gateway and can be asserted on in tests.

use thiserror::Error;

/// Errors that can occur while talking to an upstream API
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimit,

    /// Non-success status code
    #[error("Server error: {0}")]
    ServerError(u16),

    /// Request timeout
    #[error("Request timeout")]
    Timeout,

    /// Maximum retry attempts exceeded
    #[error("Maximum retry attempts exceeded")]
    MaxRetriesExceeded,

    /// Response body was not valid JSON
    #[error("Decoding error: {0}")]
    Decode(String),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Whether a later attempt at the same request might succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::RateLimit | Self::Timeout => true,
            Self::ServerError(status) => matches!(status, 429 | 500 | 502 | 503 | 504),
            Self::MaxRetriesExceeded | Self::Decode(_) | Self::InvalidUrl(_) => false,
        }
    }
}
