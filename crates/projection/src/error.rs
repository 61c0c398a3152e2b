//! Error types for coordinate transforms.

use thiserror::Error;
use velocity_common::EpsgCode;

/// Result type alias using ProjectionError.
pub type ProjectionResult<T> = Result<T, ProjectionError>;

/// Structural failures of the transform service.
///
/// A single point falling outside a projection's domain is not an error:
/// it comes back as `(NaN, NaN)` and the caller decides what that means.
#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("unknown CRS {code}: {message}")]
    UnknownCrs { code: EpsgCode, message: String },

    #[error("{operation} {source_crs} -> {target_crs} failed: {message}")]
    TransformFailed {
        operation: &'static str,
        source_crs: EpsgCode,
        target_crs: EpsgCode,
        message: String,
    },

    #[error("{operation} {source_crs} -> {target_crs} called with an empty point batch")]
    EmptyBatch {
        operation: &'static str,
        source_crs: EpsgCode,
        target_crs: EpsgCode,
    },

    #[error("affine transform is singular (determinant {0})")]
    SingularAffine(f64),
}

impl ProjectionError {
    /// Create an UnknownCrs error.
    pub fn unknown_crs(code: EpsgCode, message: impl Into<String>) -> Self {
        Self::UnknownCrs {
            code,
            message: message.into(),
        }
    }
}
