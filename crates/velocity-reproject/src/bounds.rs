//! Bounding boxes of the source granule and its image in the target CRS.

use projection::CoordinateTransform;
use tracing::debug;
use velocity_common::{BoundingBox, Interval};

use crate::error::{ReprojectError, Result};

/// Relative tolerance when comparing |dx| and |dy|.
const SQUARE_TOLERANCE: f64 = 1e-9;

/// Signed cell dimensions of a source grid.
///
/// ITS_LIVE grids store y north to south, so `dy` is normally negative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellSize {
    pub dx: f64,
    pub dy: f64,
}

impl CellSize {
    /// Validate that the cells are square and non-empty.
    pub fn new(dx: f64, dy: f64) -> Result<Self> {
        if !dx.is_finite() || !dy.is_finite() || dx == 0.0 || dy == 0.0 {
            return Err(ReprojectError::InvalidGrid(format!(
                "cell dimensions must be finite and non-zero: x={dx} y={dy}"
            )));
        }
        if (dx.abs() - dy.abs()).abs() > SQUARE_TOLERANCE * dx.abs() {
            return Err(ReprojectError::ShapeMismatch {
                dx: dx.abs(),
                dy: dy.abs(),
            });
        }
        Ok(Self { dx, dy })
    }

    /// Cell size from the first two samples of each axis.
    pub fn from_axes(x: &[f64], y: &[f64]) -> Result<Self> {
        match (x, y) {
            ([x0, x1, ..], [y0, y1, ..]) => Self::new(x1 - x0, y1 - y0),
            _ => Err(ReprojectError::EmptyGrid(format!(
                "need at least 2 samples per axis, got x={} y={}",
                x.len(),
                y.len()
            ))),
        }
    }

    /// Unsigned cell edge length.
    pub fn size(&self) -> f64 {
        self.dx.abs()
    }
}

/// Cell-boundary bounding box of a grid given its cell-center coordinates.
///
/// Extrema are pushed outward by half a cell on every side. Fails with
/// `ShapeMismatch` when `|dx| != |dy|`, before any transform work.
pub fn source_bounding_box(x: &[f64], y: &[f64], dx: f64, dy: f64) -> Result<BoundingBox> {
    let cell = CellSize::new(dx, dy)?;
    let half_x = cell.dx.abs() / 2.0;
    let half_y = cell.dy.abs() / 2.0;

    let bbox = BoundingBox::new(
        Interval::from_values(x)?.expand(half_x)?,
        Interval::from_values(y)?.expand(half_y)?,
    );
    debug!(%bbox, "P_in bounding box");
    Ok(bbox)
}

/// Bounding box in the target CRS covering the image of `source`.
///
/// The four corners are projected in one batch; their extrema are snapped
/// outward onto the `cell_size` lattice so the destination grid keeps the
/// source's nominal resolution.
pub fn target_bounding_box(
    source: &BoundingBox,
    transform: &dyn CoordinateTransform,
    cell_size: f64,
) -> Result<BoundingBox> {
    let corners = transform.forward_points(&source.corners())?;

    if corners.iter().any(|p| !p.0.is_finite() || !p.1.is_finite()) {
        return Err(ReprojectError::transform(
            "forward",
            transform.source_crs(),
            transform.target_crs(),
            format!("bounding box corners {:?} have no image in the target CRS", source.corners()),
        ));
    }

    let extent = BoundingBox::from_points(&corners)?;
    let bbox = BoundingBox::new(
        extent.x.snap_outward(cell_size)?,
        extent.y.snap_outward(cell_size)?,
    );
    debug!(%bbox, "P_out bounding box");
    Ok(bbox)
}
