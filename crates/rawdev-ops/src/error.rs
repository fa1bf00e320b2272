//! Error types for pipeline stage operations.

use thiserror::Error;

/// Result type alias for stage operations.
pub type OpsResult<T> = std::result::Result<T, OpsError>;

/// Errors from stage-level input validation.
///
/// Stages are total once their inputs validate; these errors only surface
/// at the buffer-shape boundary.
#[derive(Debug, Error)]
pub enum OpsError {
    /// Buffer dimensions are unusable for this stage.
    #[error("invalid dimensions: {0}")]
    InvalidDimensions(String),

    /// Two buffers that must agree in size do not.
    #[error("size mismatch: {0}")]
    SizeMismatch(String),
}
