//! Per-cell velocity transformation matrices.
//!
//! The closed form follows Geogrid: given the images `x` and `y` of one-cell
//! source steps and a local surface normal `n`, the matrix
//!
//! ```text
//! D = (n2*x0 - n0*x2)*(n2*y1 - n1*y2) - (n2*y0 - n0*y2)*(n2*x1 - n1*x2)
//! a =  n2 / rate_x * (n2*y1 - n1*y2) / D
//! b = -n2 / rate_y * (n2*x1 - n1*x2) / D
//! c = -n2 / rate_x * (n2*y0 - n0*y2) / D
//! d =  n2 / rate_y * (n2*x0 - n0*x2) / D
//! ```
//!
//! maps a displacement measured in source cells per time base into a
//! velocity in the target CRS, with `rate = time_delta / cell / year`.
//! Scaling its columns by `|rate|` cancels the time base and yields a
//! velocity-to-velocity transform, which is what a [`CellTransform`] holds.

use nalgebra::{Matrix2, Vector3};
use tracing::{debug, trace};
use velocity_common::{BoundingBox, Point};

use crate::basis::LocalBasis;
use crate::bounds::CellSize;
use crate::config::{ReprojectConfig, SECONDS_PER_YEAR};
use crate::map_cells;
use crate::types::{CellTransform, NoDataReason, TransformField};

/// Local surface normal of the flat-Earth approximation.
pub const SURFACE_NORMAL: Vector3<f64> = Vector3::new(0.0, 0.0, -1.0);

/// Denominators at or below this magnitude are treated as singular.
const SINGULAR_EPSILON: f64 = 1e-12;

/// Constants shared by every cell of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatrixParams {
    pub normal: Vector3<f64>,
    pub angle_tolerance_deg: f64,
    /// `time_delta / dx / seconds_per_year`, signed like `dx`.
    pub rate_x: f64,
    /// `time_delta / dy / seconds_per_year`, signed like `dy`.
    pub rate_y: f64,
}

impl MatrixParams {
    /// Derive the rate basis from the source cell size.
    pub fn new(cell: CellSize, config: &ReprojectConfig) -> Self {
        Self {
            normal: SURFACE_NORMAL,
            angle_tolerance_deg: config.angle_tolerance_deg,
            rate_x: config.time_delta_secs / cell.dx / SECONDS_PER_YEAR,
            rate_y: config.time_delta_secs / cell.dy / SECONDS_PER_YEAR,
        }
    }
}

/// Geogrid displacement-to-velocity matrix for one cell.
///
/// Returns `None` when the denominator vanishes.
pub fn displacement_matrix(
    x_unit: &Vector3<f64>,
    y_unit: &Vector3<f64>,
    normal: &Vector3<f64>,
    rate_x: f64,
    rate_y: f64,
) -> Option<Matrix2<f64>> {
    let (x0, x1, x2) = (x_unit.x, x_unit.y, x_unit.z);
    let (y0, y1, y2) = (y_unit.x, y_unit.y, y_unit.z);
    let (n0, n1, n2) = (normal.x, normal.y, normal.z);

    let xa = n2 * x0 - n0 * x2;
    let xb = n2 * x1 - n1 * x2;
    let ya = n2 * y0 - n0 * y2;
    let yb = n2 * y1 - n1 * y2;

    let denominator = xa * yb - ya * xb;
    if !denominator.is_finite() || denominator.abs() <= SINGULAR_EPSILON {
        return None;
    }

    let a = n2 / rate_x * yb / denominator;
    let b = -n2 / rate_y * xb / denominator;
    let c = -n2 / rate_x * ya / denominator;
    let d = n2 / rate_y * xa / denominator;

    Some(Matrix2::new(a, b, c, d))
}

/// Angle in degrees between the normalized basis cross product and `normal`.
///
/// `None` when the unit vectors are parallel.
pub fn normal_deviation_deg(
    x_unit: &Vector3<f64>,
    y_unit: &Vector3<f64>,
    normal: &Vector3<f64>,
) -> Option<f64> {
    let cross = x_unit.cross(y_unit).try_normalize(SINGULAR_EPSILON)?;
    let cosine = normal.dot(&cross).clamp(-1.0, 1.0);
    Some(cosine.acos().to_degrees().abs())
}

/// Transform for a single destination cell.
///
/// Checks run in order: the back-projected center must exist and lie in the
/// source box, the basis must exist and agree with the surface normal, and
/// the closed form must be non-singular.
pub fn cell_transform(
    source_point: Point,
    units: Option<(Vector3<f64>, Vector3<f64>)>,
    source_bbox: &BoundingBox,
    params: &MatrixParams,
) -> CellTransform {
    if !source_point.0.is_finite() || !source_point.1.is_finite() {
        return CellTransform::NoData(NoDataReason::DegenerateBasis);
    }

    if !source_bbox.contains_point(source_point.0, source_point.1) {
        return CellTransform::NoData(NoDataReason::OutOfExtent);
    }

    let Some((x_unit, y_unit)) = units else {
        return CellTransform::NoData(NoDataReason::DegenerateBasis);
    };

    match normal_deviation_deg(&x_unit, &y_unit, &params.normal) {
        Some(angle) if angle <= params.angle_tolerance_deg => {}
        deviation => {
            trace!(
                ?deviation,
                x_unit = ?x_unit,
                y_unit = ?y_unit,
                "Local basis inconsistent with surface normal"
            );
            return CellTransform::NoData(NoDataReason::DegenerateGeometry);
        }
    }

    let Some(raw) =
        displacement_matrix(&x_unit, &y_unit, &params.normal, params.rate_x, params.rate_y)
    else {
        return CellTransform::NoData(NoDataReason::SingularTransform);
    };

    let rate_scale = Matrix2::new(params.rate_x.abs(), 0.0, 0.0, params.rate_y.abs());
    CellTransform::Matrix(raw * rate_scale)
}

/// Build the transform field for every destination cell of a basis.
pub fn build_transforms(
    basis: &LocalBasis,
    source_bbox: &BoundingBox,
    params: &MatrixParams,
    parallel: bool,
) -> TransformField {
    let cells = map_cells(parallel, basis.len(), |i| {
        cell_transform(
            basis.source_points[i],
            basis.units.get(i),
            source_bbox,
            params,
        )
    });

    let field = TransformField::new(cells);
    debug!(
        total = field.stats.total_cells,
        valid = field.stats.valid_cells,
        out_of_extent = field.stats.out_of_extent,
        degenerate = field.stats.degenerate_basis + field.stats.degenerate_geometry,
        singular = field.stats.singular_transform,
        "Built transformation matrices"
    );
    field
}
