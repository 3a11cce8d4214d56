//! Error types for fxstore

use std::io;

/// Result type alias for fxstore operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for store operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Value too large (max 1 MB)
    #[error("Value too large: {0} bytes (max 1 MB)")]
    ValueTooLarge(usize),

    /// Keys must be non-empty
    #[error("Invalid key: {0:?}")]
    InvalidKey(String),

    /// Store is closed
    #[error("Store is closed")]
    Closed,
}

impl From<nom::Err<nom::error::Error<&[u8]>>> for Error {
    fn from(err: nom::Err<nom::error::Error<&[u8]>>) -> Self {
        Error::Parse(format!("{:?}", err))
    }
}
