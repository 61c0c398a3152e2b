//! Batch coordinate transforms between a source and a destination CRS.

use proj4rs::Proj;
use tracing::{debug, trace};
use velocity_common::{EpsgCode, Point};

use crate::error::{ProjectionError, ProjectionResult};

/// Which way a batch travels through a transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Source CRS (P_in) to destination CRS (P_out).
    Forward,
    /// Destination CRS (P_out) to source CRS (P_in).
    Inverse,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Forward => "forward",
            Direction::Inverse => "inverse",
        }
    }
}

/// A pure mapping between two coordinate reference systems.
///
/// Implementations transform whole batches in place; result index `i`
/// always corresponds to input index `i`. Points with no image in the
/// other CRS are set to `(NaN, NaN)` instead of failing the batch, so an
/// `Err` always means the service itself is unusable.
pub trait CoordinateTransform: Send + Sync {
    /// CRS of the source grid (P_in).
    fn source_crs(&self) -> EpsgCode;

    /// CRS of the destination grid (P_out).
    fn target_crs(&self) -> EpsgCode;

    /// Transform points in place in the given direction.
    fn transform(&self, direction: Direction, points: &mut [Point]) -> ProjectionResult<()>;

    /// P_in to P_out, in place.
    fn forward(&self, points: &mut [Point]) -> ProjectionResult<()> {
        self.transform(Direction::Forward, points)
    }

    /// P_out to P_in, in place.
    fn inverse(&self, points: &mut [Point]) -> ProjectionResult<()> {
        self.transform(Direction::Inverse, points)
    }

    /// P_in to P_out, returning a new batch.
    fn forward_points(&self, points: &[Point]) -> ProjectionResult<Vec<Point>> {
        let mut out = points.to_vec();
        self.forward(&mut out)?;
        Ok(out)
    }

    /// P_out to P_in, returning a new batch.
    fn inverse_points(&self, points: &[Point]) -> ProjectionResult<Vec<Point>> {
        let mut out = points.to_vec();
        self.inverse(&mut out)?;
        Ok(out)
    }

    /// Reject empty batches with the identifiers involved.
    fn ensure_non_empty(&self, direction: Direction, points: &[Point]) -> ProjectionResult<()> {
        if points.is_empty() {
            return Err(ProjectionError::EmptyBatch {
                operation: direction.as_str(),
                source_crs: self.source_crs(),
                target_crs: self.target_crs(),
            });
        }
        Ok(())
    }
}

/// Transform backed by proj4rs, resolving EPSG codes to PROJ definitions.
///
/// proj4rs works in radians for geographic CRS; this wrapper accepts and
/// returns degrees so every CRS is addressed in its native units.
pub struct Proj4Transform {
    source_crs: EpsgCode,
    target_crs: EpsgCode,
    src: Proj,
    dst: Proj,
    src_is_geo: bool,
    dst_is_geo: bool,
}

impl Proj4Transform {
    /// Create a transform between two EPSG codes.
    pub fn new(source_crs: EpsgCode, target_crs: EpsgCode) -> ProjectionResult<Self> {
        let src = build_proj(source_crs)?;
        let dst = build_proj(target_crs)?;
        let src_is_geo = src.is_latlong();
        let dst_is_geo = dst.is_latlong();

        debug!(source = %source_crs, target = %target_crs, "Created proj4rs transform");

        Ok(Self {
            source_crs,
            target_crs,
            src,
            dst,
            src_is_geo,
            dst_is_geo,
        })
    }
}

fn build_proj(code: EpsgCode) -> ProjectionResult<Proj> {
    Proj::from_user_string(&code.to_string())
        .map_err(|e| ProjectionError::unknown_crs(code, e.to_string()))
}

impl CoordinateTransform for Proj4Transform {
    fn source_crs(&self) -> EpsgCode {
        self.source_crs
    }

    fn target_crs(&self) -> EpsgCode {
        self.target_crs
    }

    fn transform(&self, direction: Direction, points: &mut [Point]) -> ProjectionResult<()> {
        self.ensure_non_empty(direction, points)?;

        let (from, to, from_geo, to_geo) = match direction {
            Direction::Forward => (&self.src, &self.dst, self.src_is_geo, self.dst_is_geo),
            Direction::Inverse => (&self.dst, &self.src, self.dst_is_geo, self.src_is_geo),
        };

        let mut failed = 0usize;
        for point in points.iter_mut() {
            let mut coord = if from_geo {
                (point.0.to_radians(), point.1.to_radians())
            } else {
                *point
            };

            let ok = proj4rs::transform::transform(from, to, &mut coord).is_ok()
                && coord.0.is_finite()
                && coord.1.is_finite();

            *point = match (ok, to_geo) {
                (true, true) => (coord.0.to_degrees(), coord.1.to_degrees()),
                (true, false) => coord,
                (false, _) => {
                    trace!(x = point.0, y = point.1, "Point has no image in target CRS");
                    failed += 1;
                    (f64::NAN, f64::NAN)
                }
            };
        }

        if failed > 0 {
            debug!(
                operation = direction.as_str(),
                source = %self.source_crs,
                target = %self.target_crs,
                failed,
                total = points.len(),
                "Some points could not be transformed"
            );
        }

        Ok(())
    }
}
