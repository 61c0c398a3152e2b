//! Error types for velocity reprojection.
//!
//! Only run-level failures live here. A destination cell that cannot be
//! mapped is an expected outcome and is reported through
//! [`crate::types::NoDataReason`] instead.

use projection::ProjectionError;
use thiserror::Error;
use velocity_common::{EpsgCode, GeometryError};

/// Errors that abort a reprojection run.
#[derive(Error, Debug)]
pub enum ReprojectError {
    /// Source cells are not square.
    #[error("cell dimensions differ: x={dx} y={dy}")]
    ShapeMismatch { dx: f64, dy: f64 },

    /// The source or destination grid has no cells.
    #[error("grid has no cells: {0}")]
    EmptyGrid(String),

    /// Grid coordinates are malformed.
    #[error("invalid grid: {0}")]
    InvalidGrid(String),

    /// The coordinate transform service failed structurally.
    #[error("{operation} {source_crs} -> {target_crs} failed: {message}")]
    Transform {
        operation: String,
        source_crs: EpsgCode,
        target_crs: EpsgCode,
        message: String,
    },

    /// The transform was built for a different CRS than the granule's.
    #[error("transform source CRS {transform} does not match granule CRS {granule}")]
    CrsMismatch {
        granule: EpsgCode,
        transform: EpsgCode,
    },

    /// The warp service failed.
    #[error("warp failed: {0}")]
    Warp(String),

    /// The granule content is inconsistent.
    #[error("invalid granule: {0}")]
    InvalidGranule(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage/IO error.
    #[error("I/O error: {0}")]
    Io(String),

    /// Granule file could not be decoded or encoded.
    #[error("format error: {0}")]
    Format(String),
}

impl ReprojectError {
    /// Create a Transform error for a named stage of the run.
    pub fn transform(
        operation: impl Into<String>,
        source_crs: EpsgCode,
        target_crs: EpsgCode,
        message: impl Into<String>,
    ) -> Self {
        Self::Transform {
            operation: operation.into(),
            source_crs,
            target_crs,
            message: message.into(),
        }
    }

    /// Create an InvalidGranule error.
    pub fn invalid_granule(msg: impl Into<String>) -> Self {
        Self::InvalidGranule(msg.into())
    }

    /// Create a Warp error.
    pub fn warp(msg: impl Into<String>) -> Self {
        Self::Warp(msg.into())
    }
}

impl From<ProjectionError> for ReprojectError {
    fn from(err: ProjectionError) -> Self {
        match err {
            ProjectionError::TransformFailed {
                operation,
                source_crs,
                target_crs,
                message,
            } => Self::transform(operation, source_crs, target_crs, message),
            ProjectionError::EmptyBatch {
                operation,
                source_crs,
                target_crs,
            } => Self::transform(operation, source_crs, target_crs, "empty point batch"),
            ProjectionError::UnknownCrs { code, message } => {
                Self::transform("create", code, code, message)
            }
            ProjectionError::SingularAffine(det) => {
                Self::InvalidGrid(format!("singular affine transform (determinant {det})"))
            }
        }
    }
}

impl From<GeometryError> for ReprojectError {
    fn from(err: GeometryError) -> Self {
        Self::InvalidGrid(err.to_string())
    }
}

impl From<std::io::Error> for ReprojectError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ReprojectError {
    fn from(err: serde_json::Error) -> Self {
        Self::Format(err.to_string())
    }
}

/// Result type for reprojection operations.
pub type Result<T> = std::result::Result<T, ReprojectError>;
