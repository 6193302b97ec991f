//! Error types for rpmgate.

use thiserror::Error;

/// Main error type for rpmgate operations.
#[derive(Error, Debug)]
pub enum RpmGateError {
    /// The requested rate cannot produce a positive, finite interval
    #[error("Invalid rate: max_rpm must be a positive finite number, got {0}")]
    InvalidRate(f64),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for RpmGateError {
    fn from(err: config::ConfigError) -> Self {
        RpmGateError::Config(err.to_string())
    }
}

/// Result type alias for rpmgate operations.
pub type Result<T> = std::result::Result<T, RpmGateError>;
