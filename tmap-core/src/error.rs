//! Error types for tmap.
//!
//! Lookups never fail: a missing or expired key is a normal `None`.
//! Errors only come from invalid arguments and configuration.

use thiserror::Error;

/// Result type alias using `TimeoutMapError`.
pub type Result<T> = std::result::Result<T, TimeoutMapError>;

/// Main error type for all tmap operations.
#[derive(Debug, Error)]
pub enum TimeoutMapError {
    /// An argument was outside its domain (e.g. a zero timeout).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration could not be parsed or is inconsistent.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl TimeoutMapError {
    /// Returns true if this error was caused by caller input rather than configuration.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, TimeoutMapError::InvalidArgument(_))
    }
}
