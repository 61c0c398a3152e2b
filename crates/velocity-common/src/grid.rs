//! Regular grids of square cells described by their cell centers.

use serde::{Deserialize, Serialize};

use crate::bbox::{BoundingBox, Interval};
use crate::error::{GeometryError, GeometryResult};

/// A 2D point in projected coordinates.
pub type Point = (f64, f64);

/// Relative spacing error tolerated when validating axis coordinates.
const SPACING_TOLERANCE: f64 = 1e-6;

/// A regular grid of square cells.
///
/// `x` holds cell centers west to east and `y` holds cell centers north to
/// south, matching the north-up raster layout of ITS_LIVE granules.
///
/// Every point batch produced from a grid is flattened row-major starting
/// at the northernmost row: index `row * nx + col`. Warped rasters use the
/// same layout, so index `i` means the same cell everywhere in a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegularGrid {
    cell_size: f64,
    x: Vec<f64>,
    y: Vec<f64>,
}

impl RegularGrid {
    /// Build the cell-center grid covering `bbox` at `cell_size` spacing.
    ///
    /// Each axis gets `round(span / cell_size)` cells, and never fewer than
    /// one, centered on the interval. For a box whose edges sit on the cell
    /// lattice this places the first center at `min + cell_size / 2` and
    /// the last at `max - cell_size / 2`.
    pub fn from_bounds(bbox: &BoundingBox, cell_size: f64) -> GeometryResult<Self> {
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(GeometryError::InvalidCellSize(cell_size));
        }

        let x = axis_centers(&bbox.x, cell_size)
            .map(|offset| bbox.x.center() + offset)
            .collect();
        let y = axis_centers(&bbox.y, cell_size)
            .map(|offset| bbox.y.center() - offset)
            .collect();

        Ok(Self { cell_size, x, y })
    }

    /// Wrap existing center coordinates, validating uniform spacing.
    ///
    /// `x` must increase and `y` must decrease by the same step.
    pub fn from_centers(x: Vec<f64>, y: Vec<f64>) -> GeometryResult<Self> {
        let cell_size = match (x.get(0..2), y.get(0..2)) {
            (Some([x0, x1]), _) => x1 - x0,
            (_, Some([y0, y1])) => y0 - y1,
            _ => return Err(GeometryError::InvalidCellSize(0.0)),
        };
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(GeometryError::InvalidCellSize(cell_size));
        }

        check_spacing("x", &x, cell_size)?;
        check_spacing("y", &y, -cell_size)?;

        Ok(Self { cell_size, x, y })
    }

    /// Cell edge length.
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Cell-center x coordinates, west to east.
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    /// Cell-center y coordinates, north to south.
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn nx(&self) -> usize {
        self.x.len()
    }

    pub fn ny(&self) -> usize {
        self.y.len()
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.nx() * self.ny()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flat index of the cell at (`col`, `row`).
    pub fn flat_index(&self, col: usize, row: usize) -> usize {
        row * self.nx() + col
    }

    /// Center of the cell at flat index `index`.
    pub fn point(&self, index: usize) -> Option<Point> {
        if index >= self.len() {
            return None;
        }
        let row = index / self.nx();
        let col = index % self.nx();
        Some((self.x[col], self.y[row]))
    }

    /// All cell centers in flattening order.
    pub fn points(&self) -> Vec<Point> {
        self.y
            .iter()
            .flat_map(|&y| self.x.iter().map(move |&x| (x, y)))
            .collect()
    }

    /// Bounding box of the cell boundaries (centers expanded by half a cell).
    pub fn bounding_box(&self) -> GeometryResult<BoundingBox> {
        let half = self.cell_size / 2.0;
        Ok(BoundingBox::new(
            Interval::from_values(&self.x)?.expand(half)?,
            Interval::from_values(&self.y)?.expand(half)?,
        ))
    }
}

/// Offsets of cell centers from the interval midpoint, in ascending order.
fn axis_centers(interval: &Interval, cell_size: f64) -> impl Iterator<Item = f64> {
    let count = ((interval.span() / cell_size).round() as usize).max(1);
    let first = -((count - 1) as f64) * cell_size / 2.0;
    (0..count).map(move |i| first + i as f64 * cell_size)
}

fn check_spacing(axis: &'static str, values: &[f64], step: f64) -> GeometryResult<()> {
    let tolerance = SPACING_TOLERANCE * step.abs();
    for (index, pair) in values.windows(2).enumerate() {
        if ((pair[1] - pair[0]) - step).abs() > tolerance {
            return Err(GeometryError::NonUniformAxis {
                axis,
                index: index + 1,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bounds_lattice_box() {
        let bbox = BoundingBox::from_extent(-480.0, -480.0, 480.0, 480.0).unwrap();
        let grid = RegularGrid::from_bounds(&bbox, 240.0).unwrap();

        assert_eq!(grid.x(), &[-360.0, -120.0, 120.0, 360.0]);
        assert_eq!(grid.y(), &[360.0, 120.0, -120.0, -360.0]);
        assert_eq!(grid.len(), 16);
    }

    #[test]
    fn test_from_bounds_degenerate_box_has_one_cell() {
        let bbox = BoundingBox::from_extent(100.0, 50.0, 100.0, 50.0).unwrap();
        let grid = RegularGrid::from_bounds(&bbox, 240.0).unwrap();

        assert_eq!(grid.nx(), 1);
        assert_eq!(grid.ny(), 1);
        assert_eq!(grid.point(0), Some((100.0, 50.0)));
    }

    #[test]
    fn test_from_bounds_rejects_bad_cell_size() {
        let bbox = BoundingBox::from_extent(0.0, 0.0, 10.0, 10.0).unwrap();
        assert!(RegularGrid::from_bounds(&bbox, 0.0).is_err());
        assert!(RegularGrid::from_bounds(&bbox, -1.0).is_err());
        assert!(RegularGrid::from_bounds(&bbox, f64::NAN).is_err());
    }

    #[test]
    fn test_points_row_major_from_north() {
        let grid = RegularGrid::from_centers(vec![0.0, 10.0, 20.0], vec![5.0, -5.0]).unwrap();
        let points = grid.points();

        assert_eq!(points.len(), 6);
        assert_eq!(points[0], (0.0, 5.0));
        assert_eq!(points[2], (20.0, 5.0));
        assert_eq!(points[3], (0.0, -5.0));
        assert_eq!(grid.point(grid.flat_index(1, 1)), Some((10.0, -5.0)));
    }

    #[test]
    fn test_from_centers_rejects_non_uniform() {
        let result = RegularGrid::from_centers(vec![0.0, 10.0, 25.0], vec![5.0, -5.0]);
        assert!(matches!(
            result,
            Err(GeometryError::NonUniformAxis { axis: "x", index: 2 })
        ));

        // y must step by -cell_size
        assert!(RegularGrid::from_centers(vec![0.0, 10.0], vec![-5.0, 5.0]).is_err());
    }

    #[test]
    fn test_bounding_box_of_centers() {
        let grid = RegularGrid::from_centers(vec![0.0, 10.0], vec![10.0, 0.0]).unwrap();
        let bbox = grid.bounding_box().unwrap();
        assert_eq!(bbox.to_extent(), [-5.0, -5.0, 15.0, 15.0]);
    }
}
