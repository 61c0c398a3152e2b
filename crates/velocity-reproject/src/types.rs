//! Core types for velocity reprojection.

use nalgebra::{Matrix2, Vector2, Vector3};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ReprojectError;

/// Why a destination cell has no transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoDataReason {
    /// The back-projected cell center lies outside the source granule.
    OutOfExtent,
    /// The transform had no image for the cell or its one-cell steps, or a
    /// step collapsed to zero length.
    DegenerateBasis,
    /// The local basis is not consistent with the flat-surface normal.
    DegenerateGeometry,
    /// The closed-form matrix has a vanishing denominator.
    SingularTransform,
}

/// Per-cell velocity transform: a 2x2 matrix or a NODATA marker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellTransform {
    Matrix(Matrix2<f64>),
    NoData(NoDataReason),
}

impl CellTransform {
    pub fn is_nodata(&self) -> bool {
        matches!(self, CellTransform::NoData(_))
    }

    /// The matrix, if this cell has one.
    pub fn matrix(&self) -> Option<&Matrix2<f64>> {
        match self {
            CellTransform::Matrix(m) => Some(m),
            CellTransform::NoData(_) => None,
        }
    }

    /// Apply to a velocity 2-vector. NODATA cells give `None`.
    pub fn apply(&self, vx: f64, vy: f64) -> Option<(f64, f64)> {
        self.matrix().map(|m| {
            let v = m * Vector2::new(vx, vy);
            (v.x, v.y)
        })
    }
}

/// Per-cell unit vectors describing how one source-cell step along each
/// source axis appears in the destination CRS.
///
/// `None` marks a cell whose step could not be normalized.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnitVectorField {
    pub x_unit: Vec<Option<Vector3<f64>>>,
    pub y_unit: Vec<Option<Vector3<f64>>>,
}

impl UnitVectorField {
    pub fn len(&self) -> usize {
        self.x_unit.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x_unit.is_empty()
    }

    /// Unit vector pair of one cell, if both are valid.
    pub fn get(&self, index: usize) -> Option<(Vector3<f64>, Vector3<f64>)> {
        match (self.x_unit.get(index), self.y_unit.get(index)) {
            (Some(Some(x)), Some(Some(y))) => Some((*x, *y)),
            _ => None,
        }
    }
}

/// NODATA accounting for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReprojectionStats {
    pub total_cells: usize,
    pub valid_cells: usize,
    pub out_of_extent: usize,
    pub degenerate_basis: usize,
    pub degenerate_geometry: usize,
    pub singular_transform: usize,
}

impl ReprojectionStats {
    /// Tally a slice of cell transforms.
    pub fn from_cells(cells: &[CellTransform]) -> Self {
        let mut stats = Self {
            total_cells: cells.len(),
            ..Self::default()
        };
        for cell in cells {
            match cell {
                CellTransform::Matrix(_) => stats.valid_cells += 1,
                CellTransform::NoData(NoDataReason::OutOfExtent) => stats.out_of_extent += 1,
                CellTransform::NoData(NoDataReason::DegenerateBasis) => {
                    stats.degenerate_basis += 1
                }
                CellTransform::NoData(NoDataReason::DegenerateGeometry) => {
                    stats.degenerate_geometry += 1
                }
                CellTransform::NoData(NoDataReason::SingularTransform) => {
                    stats.singular_transform += 1
                }
            }
        }
        stats
    }

    /// Number of cells without a transform.
    pub fn nodata_cells(&self) -> usize {
        self.total_cells - self.valid_cells
    }

    /// Fraction of cells without a transform (0.0 - 1.0).
    pub fn nodata_fraction(&self) -> f64 {
        if self.total_cells == 0 {
            0.0
        } else {
            self.nodata_cells() as f64 / self.total_cells as f64
        }
    }
}

/// Cell transforms aligned with the destination grid's flattening order.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformField {
    pub cells: Vec<CellTransform>,
    pub stats: ReprojectionStats,
}

impl TransformField {
    pub fn new(cells: Vec<CellTransform>) -> Self {
        let stats = ReprojectionStats::from_cells(&cells);
        Self { cells, stats }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Interpolation method for the raster warp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationMethod {
    /// Nearest neighbor (preserves exact values).
    Nearest,
    /// Bilinear interpolation (smooth, slight value changes).
    #[default]
    Bilinear,
    /// Bicubic interpolation (smoothest, more compute).
    Cubic,
}

impl FromStr for InterpolationMethod {
    type Err = ReprojectError;

    /// Case-insensitive; unknown names are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "nearest" | "near" => Ok(Self::Nearest),
            "bilinear" | "linear" => Ok(Self::Bilinear),
            "cubic" | "bicubic" => Ok(Self::Cubic),
            _ => Err(ReprojectError::Config(format!(
                "unknown interpolation method '{s}' (expected nearest, bilinear or cubic)"
            ))),
        }
    }
}

impl std::fmt::Display for InterpolationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nearest => write!(f, "nearest"),
            Self::Bilinear => write!(f, "bilinear"),
            Self::Cubic => write!(f, "cubic"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_transform_apply() {
        let rotate = CellTransform::Matrix(Matrix2::new(0.0, -1.0, 1.0, 0.0));
        assert_eq!(rotate.apply(2.0, 0.0), Some((0.0, 2.0)));

        let nodata = CellTransform::NoData(NoDataReason::OutOfExtent);
        assert!(nodata.is_nodata());
        assert_eq!(nodata.apply(2.0, 0.0), None);
    }

    #[test]
    fn test_stats_from_cells() {
        let cells = vec![
            CellTransform::Matrix(Matrix2::identity()),
            CellTransform::Matrix(Matrix2::identity()),
            CellTransform::NoData(NoDataReason::OutOfExtent),
            CellTransform::NoData(NoDataReason::DegenerateGeometry),
        ];
        let stats = ReprojectionStats::from_cells(&cells);

        assert_eq!(stats.total_cells, 4);
        assert_eq!(stats.valid_cells, 2);
        assert_eq!(stats.out_of_extent, 1);
        assert_eq!(stats.degenerate_geometry, 1);
        assert_eq!(stats.nodata_cells(), 2);
        assert!((stats.nodata_fraction() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_stats_fraction() {
        assert_eq!(ReprojectionStats::default().nodata_fraction(), 0.0);
    }

    #[test]
    fn test_interpolation_method_from_str() {
        let parse = |s: &str| s.parse::<InterpolationMethod>().unwrap();
        assert_eq!(parse("nearest"), InterpolationMethod::Nearest);
        assert_eq!(parse("BILINEAR"), InterpolationMethod::Bilinear);
        assert_eq!(parse("bicubic"), InterpolationMethod::Cubic);
    }

    #[test]
    fn test_interpolation_method_rejects_unknown() {
        let err = "nearst".parse::<InterpolationMethod>().unwrap_err();
        assert!(matches!(err, ReprojectError::Config(ref msg) if msg.contains("nearst")));
    }
}
