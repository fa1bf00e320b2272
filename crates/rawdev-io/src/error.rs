//! Error types for RAW input handling.

use thiserror::Error;

/// Result type alias for I/O operations.
pub type IoResult<T> = std::result::Result<T, IoError>;

/// Errors from decoding or normalizing input data.
#[derive(Debug, Error)]
pub enum IoError {
    /// The file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The container decoded but its content is unusable.
    #[error("decode error: {0}")]
    Decode(String),

    /// The format is recognized but not supported here.
    #[error("unsupported input: {0}")]
    Unsupported(String),
}
