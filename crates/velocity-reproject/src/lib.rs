//! Vector-correct reprojection of ice velocity granules.
//!
//! Resampling `vx` and `vy` as two independent scalar rasters is not enough
//! to move a velocity field into another projection: the components must
//! also be re-expressed in the destination's local basis, which rotates
//! (and for non-conformal projections, shears) from cell to cell.
//!
//! This crate estimates that local basis numerically for every destination
//! cell and turns it into a 2x2 transform applied to the warped components.
//!
//! # Architecture
//!
//! ```text
//! VelocityGranule (P_in)
//!      │
//!      ├─► bounds::source_bounding_box      cell-boundary box in P_in
//!      │
//!      ├─► bounds::target_bounding_box      4 corners through forward()
//!      │
//!      ├─► RegularGrid::from_bounds         destination cell centers
//!      │
//!      ├─► basis::estimate_local_basis      inverse, +1 cell, forward
//!      │         │
//!      │         ▼
//!      │   matrix::build_transforms         CellTransform per cell
//!      │
//!      ├─► RasterWarp::warp (concurrently)  vx, vy on destination grid
//!      │
//!      └─► apply::apply_transforms          true P_out components
//!               │
//!               ▼
//!          VelocityGranule (P_out) + ReprojectionStats
//! ```
//!
//! # Example
//!
//! ```ignore
//! use projection::Proj4Transform;
//! use velocity_reproject::{InverseMappingWarp, ReprojectConfig, Reprojector, VelocityGranule};
//!
//! let granule = VelocityGranule::load_json("granule.json")?;
//! let reprojector = Reprojector::new(&granule, ReprojectConfig::default())?;
//! let transform = Proj4Transform::new(granule.epsg, "EPSG:3413".parse()?)?;
//! let output = reprojector.run(&transform, &InverseMappingWarp::new(true))?;
//! println!("{:.1}% NODATA", output.stats.nodata_fraction() * 100.0);
//! ```

pub mod apply;
pub mod basis;
pub mod bounds;
pub mod config;
pub mod error;
pub mod granule;
pub mod matrix;
pub mod pipeline;
pub mod types;
pub mod warp;

#[cfg(feature = "netcdf")]
pub mod netcdf_io;

pub use apply::{apply_transforms, speed};
pub use basis::{estimate_local_basis, LocalBasis};
pub use bounds::{source_bounding_box, target_bounding_box, CellSize};
pub use config::ReprojectConfig;
pub use error::{ReprojectError, Result};
pub use granule::VelocityGranule;
pub use matrix::{build_transforms, cell_transform, displacement_matrix, MatrixParams};
pub use pipeline::{ReprojectionOutput, Reprojector, TargetPlan};
pub use types::{
    CellTransform, InterpolationMethod, NoDataReason, ReprojectionStats, TransformField,
    UnitVectorField,
};
pub use warp::{InverseMappingWarp, RasterWarp, SourceRaster, WarpRequest};

use rayon::prelude::*;

/// Map every cell index through `f`, in parallel when requested.
///
/// Cells never depend on each other, so both paths give identical results.
pub(crate) fn map_cells<T, F>(parallel: bool, len: usize, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize) -> T + Sync + Send,
{
    if parallel {
        (0..len).into_par_iter().map(f).collect()
    } else {
        (0..len).map(f).collect()
    }
}
