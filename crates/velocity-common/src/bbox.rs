//! Intervals and bounding boxes in projected coordinates.
//!
//! Coordinates are in the native units of the CRS they were sampled in
//! (meters for the polar stereographic and UTM projections ITS_LIVE uses).

use serde::{Deserialize, Serialize};

use crate::error::{GeometryError, GeometryResult};

/// Fraction of a cell below which a coordinate is considered to sit on a
/// lattice line when snapping. Absorbs round-off from CRS transforms.
const SNAP_TOLERANCE: f64 = 1e-6;

/// A closed interval `[min, max]` along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawInterval")]
pub struct Interval {
    min: f64,
    max: f64,
}

#[derive(Deserialize)]
struct RawInterval {
    min: f64,
    max: f64,
}

impl TryFrom<RawInterval> for Interval {
    type Error = GeometryError;

    fn try_from(raw: RawInterval) -> GeometryResult<Self> {
        Interval::new(raw.min, raw.max)
    }
}

impl Interval {
    /// Create an interval, rejecting inverted or non-finite bounds.
    pub fn new(min: f64, max: f64) -> GeometryResult<Self> {
        if !min.is_finite() || !max.is_finite() {
            return Err(GeometryError::NonFiniteInterval { min, max });
        }
        if min > max {
            return Err(GeometryError::InvertedInterval { min, max });
        }
        Ok(Self { min, max })
    }

    /// Interval spanning the extrema of a set of samples.
    ///
    /// Non-finite samples are rejected rather than skipped: a NaN among
    /// transformed corner points means the box itself is unusable.
    pub fn from_values(values: &[f64]) -> GeometryResult<Self> {
        if values.is_empty() || values.iter().any(|v| !v.is_finite()) {
            return Err(GeometryError::EmptySamples);
        }

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Self::new(min, max)
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Length of the interval.
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Midpoint of the interval.
    pub fn center(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    /// Inclusive containment test.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Grow the interval by `amount` on both ends.
    pub fn expand(&self, amount: f64) -> GeometryResult<Self> {
        Self::new(self.min - amount, self.max + amount)
    }

    /// Snap both ends outward onto the lattice of multiples of `step`.
    ///
    /// Ends already within [`SNAP_TOLERANCE`] of a lattice line stay put.
    pub fn snap_outward(&self, step: f64) -> GeometryResult<Self> {
        if !step.is_finite() || step <= 0.0 {
            return Err(GeometryError::InvalidCellSize(step));
        }

        let tolerance = SNAP_TOLERANCE * step;
        let min = ((self.min + tolerance) / step).floor() * step;
        let max = ((self.max - tolerance) / step).ceil() * step;
        Self::new(min, max.max(min))
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

/// An axis-aligned bounding box as a pair of intervals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: Interval,
    pub y: Interval,
}

impl BoundingBox {
    /// Create a bounding box from its x and y intervals.
    pub fn new(x: Interval, y: Interval) -> Self {
        Self { x, y }
    }

    /// Create a bounding box from corner coordinates.
    pub fn from_extent(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> GeometryResult<Self> {
        Ok(Self {
            x: Interval::new(min_x, max_x)?,
            y: Interval::new(min_y, max_y)?,
        })
    }

    /// Smallest box enclosing all points.
    pub fn from_points(points: &[(f64, f64)]) -> GeometryResult<Self> {
        let xs: Vec<f64> = points.iter().map(|p| p.0).collect();
        let ys: Vec<f64> = points.iter().map(|p| p.1).collect();
        Ok(Self {
            x: Interval::from_values(&xs)?,
            y: Interval::from_values(&ys)?,
        })
    }

    /// Corners clockwise from the upper-left: UL, UR, LR, LL.
    pub fn corners(&self) -> [(f64, f64); 4] {
        [
            (self.x.min, self.y.max),
            (self.x.max, self.y.max),
            (self.x.max, self.y.min),
            (self.x.min, self.y.min),
        ]
    }

    /// Width of the bounding box in coordinate units.
    pub fn width(&self) -> f64 {
        self.x.span()
    }

    /// Height of the bounding box in coordinate units.
    pub fn height(&self) -> f64 {
        self.y.span()
    }

    /// Check if a point is contained within this bbox (boundary inclusive).
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        self.x.contains(x) && self.y.contains(y)
    }

    /// Check if this bbox overlaps another with non-zero area.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.x.min < other.x.max
            && self.x.max > other.x.min
            && self.y.min < other.y.max
            && self.y.max > other.y.min
    }

    /// Output bounds in GDAL `(minX, minY, maxX, maxY)` order.
    pub fn to_extent(&self) -> [f64; 4] {
        [self.x.min, self.y.min, self.x.max, self.y.max]
    }
}

impl std::fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "x: {} y: {}", self.x, self.y)
    }
}
