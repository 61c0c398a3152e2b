//! Exact planar transforms.
//!
//! These are deterministic stand-ins for a projection engine: an affine map
//! has the same local basis everywhere, so the expected per-cell velocity
//! transform is known in closed form.

use nalgebra::{Matrix2, Vector2};
use velocity_common::{EpsgCode, Point};

use crate::error::{ProjectionError, ProjectionResult};
use crate::transform::{CoordinateTransform, Direction};

/// Transform between two labels of the same CRS. Points pass through.
#[derive(Debug, Clone, Copy)]
pub struct IdentityTransform {
    source_crs: EpsgCode,
    target_crs: EpsgCode,
}

impl IdentityTransform {
    /// Identity on a single CRS.
    pub fn new(crs: EpsgCode) -> Self {
        Self {
            source_crs: crs,
            target_crs: crs,
        }
    }

    /// Identity between two codes known to describe the same plane.
    pub fn between(source_crs: EpsgCode, target_crs: EpsgCode) -> Self {
        Self {
            source_crs,
            target_crs,
        }
    }
}

impl CoordinateTransform for IdentityTransform {
    fn source_crs(&self) -> EpsgCode {
        self.source_crs
    }

    fn target_crs(&self) -> EpsgCode {
        self.target_crs
    }

    fn transform(&self, direction: Direction, points: &mut [Point]) -> ProjectionResult<()> {
        self.ensure_non_empty(direction, points)
    }
}

/// Planar affine map `q = A p + t` from the source to the destination CRS.
#[derive(Debug, Clone, Copy)]
pub struct AffineTransform {
    source_crs: EpsgCode,
    target_crs: EpsgCode,
    linear: Matrix2<f64>,
    translation: Vector2<f64>,
    inverse_linear: Matrix2<f64>,
}

impl AffineTransform {
    /// Create an affine transform from its linear part and translation.
    pub fn new(
        source_crs: EpsgCode,
        target_crs: EpsgCode,
        linear: Matrix2<f64>,
        translation: Vector2<f64>,
    ) -> ProjectionResult<Self> {
        let det = linear.determinant();
        let inverse_linear = linear
            .try_inverse()
            .filter(|_| det.abs() > f64::EPSILON)
            .ok_or(ProjectionError::SingularAffine(det))?;

        Ok(Self {
            source_crs,
            target_crs,
            linear,
            translation,
            inverse_linear,
        })
    }

    /// Counter-clockwise rotation by `degrees` about the origin.
    pub fn rotation(source_crs: EpsgCode, target_crs: EpsgCode, degrees: f64) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        let linear = Matrix2::new(cos, -sin, sin, cos);
        Self {
            source_crs,
            target_crs,
            linear,
            translation: Vector2::zeros(),
            inverse_linear: linear.transpose(),
        }
    }

    /// Pure shift by `(dx, dy)`.
    pub fn translation(source_crs: EpsgCode, target_crs: EpsgCode, dx: f64, dy: f64) -> Self {
        Self {
            source_crs,
            target_crs,
            linear: Matrix2::identity(),
            translation: Vector2::new(dx, dy),
            inverse_linear: Matrix2::identity(),
        }
    }

    fn apply_forward(&self, p: Point) -> Point {
        let q = self.linear * Vector2::new(p.0, p.1) + self.translation;
        (q.x, q.y)
    }

    fn apply_inverse(&self, q: Point) -> Point {
        let p = self.inverse_linear * (Vector2::new(q.0, q.1) - self.translation);
        (p.x, p.y)
    }
}

impl CoordinateTransform for AffineTransform {
    fn source_crs(&self) -> EpsgCode {
        self.source_crs
    }

    fn target_crs(&self) -> EpsgCode {
        self.target_crs
    }

    fn transform(&self, direction: Direction, points: &mut [Point]) -> ProjectionResult<()> {
        self.ensure_non_empty(direction, points)?;
        for point in points.iter_mut() {
            *point = match direction {
                Direction::Forward => self.apply_forward(*point),
                Direction::Inverse => self.apply_inverse(*point),
            };
        }
        Ok(())
    }
}
