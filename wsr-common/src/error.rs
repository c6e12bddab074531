//! Common error types for World Snap Roulette

use thiserror::Error;

/// Common result type for WSR operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by WSR crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<crate::models::GeoError> for Error {
    fn from(err: crate::models::GeoError) -> Self {
        Error::InvalidInput(err.to_string())
    }
}
