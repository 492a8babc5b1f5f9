//! Unified error handling for the newsquery crate
//!
//! Upstream failures (network errors, non-2xx responses, malformed JSON) are
//! absorbed by the request gateway and never show up here. What remains are
//! caller errors (bad dates, bad configuration) and construction-time
//! failures (ontology table, HTTP client, cache backend).
//!
//! # Usage
//!
//! ```rust,ignore
//! use newsquery::error::{Error, ErrorCategory, NewsQueryErrorTrait};
//!
//! fn handle_error(err: Error) {
//!     if err.category() == ErrorCategory::Input {
//!         eprintln!("Check your arguments: {err}");
//!     }
//! }
//! ```

use thiserror::Error;

pub use crate::utils::error::FetchError;

/// Common trait for newsquery error types
pub trait NewsQueryErrorTrait: std::error::Error {
    /// Check if this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Network-related errors (HTTP client setup, transport)
    Network,
    /// Invalid arguments supplied by the caller
    Input,
    /// Parsing and data extraction errors
    Parsing,
    /// Cache backend errors
    Cache,
    /// Configuration and validation errors
    Config,
}

impl ErrorCategory {
    /// Short human-readable label
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Input => "input",
            Self::Parsing => "parsing",
            Self::Cache => "cache",
            Self::Config => "config",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Unified error type for the newsquery crate
#[derive(Error, Debug)]
pub enum Error {
    /// A date argument that is not a `YYYY-MM-DD` calendar day
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    /// The ontology lookup table could not be loaded
    #[error("Ontology table error: {0}")]
    Ontology(String),

    /// Fetch-specific errors
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Cache backend errors
    #[error("Cache error: {0}")]
    Cache(String),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),
}

impl NewsQueryErrorTrait for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Fetch(e) => e.is_recoverable(),
            Self::Cache(_) => true,
            Self::InvalidDate(_) | Self::Ontology(_) | Self::Config(_) => false,
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Fetch(_) => ErrorCategory::Network,
            Self::InvalidDate(_) => ErrorCategory::Input,
            Self::Ontology(_) => ErrorCategory::Parsing,
            Self::Cache(_) => ErrorCategory::Cache,
            Self::Config(_) => ErrorCategory::Config,
        }
    }
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
