//! Pipeline-level error type.
//!
//! Kernels cannot fail at runtime; every error surfaces at the `run`
//! boundary. Out-of-range scalars clamp with a warning instead of failing;
//! only nonsense inputs (bad levels, empty or odd-sized mosaics,
//! non-monotone curves) reject the request.

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

/// Errors surfaced by [`crate::run`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A parameter is outside its documented domain in a way clamping
    /// cannot repair (currently: curve x-coordinates out of order).
    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    /// The input image or its metadata is unusable.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Numeric blow-up detected (debug builds only).
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<rawdev_ops::OpsError> for PipelineError {
    fn from(e: rawdev_ops::OpsError) -> Self {
        PipelineError::InvalidInput(e.to_string())
    }
}
