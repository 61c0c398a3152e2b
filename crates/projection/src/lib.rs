//! Coordinate reference system transformations.
//!
//! The reprojection core only ever talks to a [`CoordinateTransform`]:
//! a pure, batch-oriented mapping between a source CRS (P_in) and a
//! destination CRS (P_out) in both directions. [`Proj4Transform`] backs it
//! with proj4rs for real EPSG pairs; [`IdentityTransform`] and
//! [`AffineTransform`] give exact planar geometry for tests and for
//! re-gridding within a single CRS.

pub mod affine;
pub mod error;
pub mod transform;

pub use affine::{AffineTransform, IdentityTransform};
pub use error::{ProjectionError, ProjectionResult};
pub use transform::{CoordinateTransform, Direction, Proj4Transform};
