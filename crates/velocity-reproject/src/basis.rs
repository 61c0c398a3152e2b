//! Finite-difference estimate of the local source basis in the target CRS.
//!
//! No closed-form Jacobian is assumed: for every destination cell the
//! center is mapped back to the source CRS, stepped by one source cell along
//! each source axis, and mapped forward again. The normalized differences
//! are the images of the source axes at that cell.

use nalgebra::Vector3;
use projection::CoordinateTransform;
use tracing::debug;
use velocity_common::Point;

use crate::bounds::CellSize;
use crate::error::Result;
use crate::map_cells;
use crate::types::UnitVectorField;

/// Steps shorter than this fraction of a cell are treated as collapsed.
const MIN_STEP_FRACTION: f64 = 1e-12;

/// Local basis of every destination cell.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalBasis {
    /// Destination cell centers mapped back into the source CRS (`p_in`).
    pub source_points: Vec<Point>,
    /// Images of one-cell source steps, normalized.
    pub units: UnitVectorField,
}

impl LocalBasis {
    pub fn len(&self) -> usize {
        self.source_points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.source_points.is_empty()
    }
}

/// Estimate unit vectors for each destination cell center.
///
/// `target_points` must be in the destination grid's flattening order; the
/// result is aligned with it. Uses two transform calls regardless of grid
/// size: one inverse batch, one forward batch of `3 * n` points.
pub fn estimate_local_basis(
    target_points: &[Point],
    transform: &dyn CoordinateTransform,
    cell: CellSize,
    parallel: bool,
) -> Result<LocalBasis> {
    let n = target_points.len();
    let source_points = transform.inverse_points(target_points)?;

    // [p_in.., p_in + (dx, 0).., p_in + (0, dy)..]
    let mut batch = Vec::with_capacity(3 * n);
    batch.extend_from_slice(&source_points);
    batch.extend(source_points.iter().map(|p| (p.0 + cell.dx, p.1)));
    batch.extend(source_points.iter().map(|p| (p.0, p.1 + cell.dy)));
    transform.forward(&mut batch)?;

    let (q0, rest) = batch.split_at(n);
    let (q1, q2) = rest.split_at(n);
    let min_norm = cell.size() * MIN_STEP_FRACTION;

    let x_unit = map_cells(parallel, n, |i| unit_step(q0[i], q1[i], min_norm));
    let y_unit = map_cells(parallel, n, |i| unit_step(q0[i], q2[i], min_norm));

    let invalid = x_unit
        .iter()
        .zip(&y_unit)
        .filter(|(x, y)| x.is_none() || y.is_none())
        .count();
    debug!(cells = n, invalid, "Estimated local unit vectors");

    Ok(LocalBasis {
        source_points,
        units: UnitVectorField { x_unit, y_unit },
    })
}

/// Normalized `to - from` as a 3-vector with z = 0.
///
/// `None` when either end has no image or the step collapsed.
pub fn unit_step(from: Point, to: Point, min_norm: f64) -> Option<Vector3<f64>> {
    let diff = Vector3::new(to.0 - from.0, to.1 - from.1, 0.0);
    if !diff.iter().all(|c| c.is_finite()) {
        return None;
    }
    diff.try_normalize(min_norm)
}
