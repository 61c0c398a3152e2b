//! Common types shared across the velocity reprojection workspace.

pub mod bbox;
pub mod crs;
pub mod error;
pub mod grid;

pub use bbox::{BoundingBox, Interval};
pub use crs::{CrsParseError, EpsgCode};
pub use error::{GeometryError, GeometryResult};
pub use grid::{Point, RegularGrid};
