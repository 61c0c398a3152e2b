//! Coordinate transform doubles.

use projection::{CoordinateTransform, Direction, ProjectionError, ProjectionResult};
use std::sync::atomic::{AtomicUsize, Ordering};
use velocity_common::{EpsgCode, Point};

/// Wraps a transform and counts batch calls per direction.
pub struct CountingTransform<T> {
    inner: T,
    forward_calls: AtomicUsize,
    inverse_calls: AtomicUsize,
}

impl<T: CoordinateTransform> CountingTransform<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            forward_calls: AtomicUsize::new(0),
            inverse_calls: AtomicUsize::new(0),
        }
    }

    pub fn forward_calls(&self) -> usize {
        self.forward_calls.load(Ordering::SeqCst)
    }

    pub fn inverse_calls(&self) -> usize {
        self.inverse_calls.load(Ordering::SeqCst)
    }

    /// Total batch calls in either direction.
    pub fn calls(&self) -> usize {
        self.forward_calls() + self.inverse_calls()
    }
}

impl<T: CoordinateTransform> CoordinateTransform for CountingTransform<T> {
    fn source_crs(&self) -> EpsgCode {
        self.inner.source_crs()
    }

    fn target_crs(&self) -> EpsgCode {
        self.inner.target_crs()
    }

    fn transform(&self, direction: Direction, points: &mut [Point]) -> ProjectionResult<()> {
        let counter = match direction {
            Direction::Forward => &self.forward_calls,
            Direction::Inverse => &self.inverse_calls,
        };
        counter.fetch_add(1, Ordering::SeqCst);
        self.inner.transform(direction, points)
    }
}

/// Transform whose every call fails, as a service with a bad definition would.
#[derive(Debug, Clone, Copy)]
pub struct FailingTransform {
    source_crs: EpsgCode,
    target_crs: EpsgCode,
}

impl FailingTransform {
    pub fn new(source_crs: EpsgCode, target_crs: EpsgCode) -> Self {
        Self {
            source_crs,
            target_crs,
        }
    }
}

impl CoordinateTransform for FailingTransform {
    fn source_crs(&self) -> EpsgCode {
        self.source_crs
    }

    fn target_crs(&self) -> EpsgCode {
        self.target_crs
    }

    fn transform(&self, direction: Direction, _points: &mut [Point]) -> ProjectionResult<()> {
        Err(ProjectionError::TransformFailed {
            operation: direction.as_str(),
            source_crs: self.source_crs,
            target_crs: self.target_crs,
            message: "transform service unavailable".to_string(),
        })
    }
}

/// Transform that has no image for points inside a box.
///
/// Forward maps pass through, except that source points inside `hole`
/// become `(NaN, NaN)`; inverse maps always pass through.
#[derive(Debug, Clone, Copy)]
pub struct HoleTransform {
    crs: EpsgCode,
    hole: (f64, f64, f64, f64),
}

impl HoleTransform {
    /// `hole` is (min_x, min_y, max_x, max_y) in the source CRS.
    pub fn new(crs: EpsgCode, hole: (f64, f64, f64, f64)) -> Self {
        Self { crs, hole }
    }
}

impl CoordinateTransform for HoleTransform {
    fn source_crs(&self) -> EpsgCode {
        self.crs
    }

    fn target_crs(&self) -> EpsgCode {
        self.crs
    }

    fn transform(&self, direction: Direction, points: &mut [Point]) -> ProjectionResult<()> {
        self.ensure_non_empty(direction, points)?;
        if direction == Direction::Forward {
            let (min_x, min_y, max_x, max_y) = self.hole;
            for point in points.iter_mut() {
                if point.0 > min_x && point.0 < max_x && point.1 > min_y && point.1 < max_y {
                    *point = (f64::NAN, f64::NAN);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use projection::IdentityTransform;

    #[test]
    fn test_counting_transform() {
        let transform = CountingTransform::new(IdentityTransform::new(EpsgCode::POLAR_NORTH));
        let mut points = vec![(1.0, 2.0)];
        transform.forward(&mut points).unwrap();
        transform.inverse(&mut points).unwrap();
        transform.inverse(&mut points).unwrap();

        assert_eq!(transform.forward_calls(), 1);
        assert_eq!(transform.inverse_calls(), 2);
        assert_eq!(points, vec![(1.0, 2.0)]);
    }

    #[test]
    fn test_failing_transform() {
        let transform = FailingTransform::new(EpsgCode::POLAR_NORTH, EpsgCode::WGS84);
        let mut points = vec![(0.0, 0.0)];
        assert!(transform.forward(&mut points).is_err());
    }

    #[test]
    fn test_hole_transform() {
        let transform = HoleTransform::new(EpsgCode::POLAR_NORTH, (-1.0, -1.0, 1.0, 1.0));
        let mut points = vec![(0.0, 0.0), (5.0, 5.0)];
        transform.forward(&mut points).unwrap();
        assert!(points[0].0.is_nan());
        assert_eq!(points[1], (5.0, 5.0));
    }
}
