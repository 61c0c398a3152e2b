//! Error types for grid geometry.

use thiserror::Error;

/// Result type alias using GeometryError.
pub type GeometryResult<T> = Result<T, GeometryError>;

/// Errors raised while constructing intervals, boxes and grids.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("Invalid interval: min {min} is greater than max {max}")]
    InvertedInterval { min: f64, max: f64 },

    #[error("Interval bounds must be finite, got [{min}, {max}]")]
    NonFiniteInterval { min: f64, max: f64 },

    #[error("Cannot derive an interval from an empty or non-finite sample set")]
    EmptySamples,

    #[error("Cell size must be finite and > 0, got {0}")]
    InvalidCellSize(f64),

    #[error("Grid axis '{axis}' is not uniformly spaced at index {index}")]
    NonUniformAxis { axis: &'static str, index: usize },
}
