//! Raster warp onto the destination grid.
//!
//! The warp only resamples scalar values; it knows nothing about vectors.
//! Its output is aligned with the destination grid's flattening order so
//! the per-cell matrices can be applied index by index afterwards.

pub mod interpolation;

use projection::CoordinateTransform;
use rayon::prelude::*;
use tracing::debug;
use velocity_common::RegularGrid;

use crate::error::{ReprojectError, Result};
use crate::types::InterpolationMethod;
use interpolation::{sample, RasterView};

/// A source raster on its own grid.
#[derive(Debug, Clone, Copy)]
pub struct SourceRaster<'a> {
    pub grid: &'a RegularGrid,
    /// Row-major values, northernmost row first.
    pub data: &'a [f32],
    /// Fill value treated as missing.
    pub nodata: f32,
}

/// Parameters of one warp.
#[derive(Clone, Copy)]
pub struct WarpRequest<'a> {
    /// Source (P_in) to destination (P_out) transform.
    pub transform: &'a dyn CoordinateTransform,
    /// Destination grid: footprint and resolution.
    pub target_grid: &'a RegularGrid,
    pub interpolation: InterpolationMethod,
    /// Fill value for destination cells without data.
    pub nodata: f32,
}

/// A service that resamples a raster into another CRS.
pub trait RasterWarp: Send + Sync {
    /// Resample `source` onto `request.target_grid`.
    ///
    /// Returns one value per destination cell in flattening order, with
    /// `request.nodata` where the source has no data.
    fn warp(&self, source: &SourceRaster<'_>, request: &WarpRequest<'_>) -> Result<Vec<f32>>;
}

/// Inverse-mapping warp: every destination cell center is projected back
/// into the source CRS (one batch) and the source is sampled there.
#[derive(Debug, Clone, Copy, Default)]
pub struct InverseMappingWarp {
    parallel: bool,
}

impl InverseMappingWarp {
    pub fn new(parallel: bool) -> Self {
        Self { parallel }
    }
}

impl RasterWarp for InverseMappingWarp {
    fn warp(&self, source: &SourceRaster<'_>, request: &WarpRequest<'_>) -> Result<Vec<f32>> {
        let grid = source.grid;
        if grid.is_empty() || request.target_grid.is_empty() {
            return Err(ReprojectError::EmptyGrid("warp source or target".to_string()));
        }

        // Missing values become NaN so the kernels skip them
        let cleaned: Vec<f32> = source
            .data
            .iter()
            .map(|&v| if v == source.nodata { f32::NAN } else { v })
            .collect();
        let view = RasterView::new(&cleaned, grid.nx(), grid.ny()).ok_or_else(|| {
            ReprojectError::warp(format!(
                "source has {} values for a {}x{} grid",
                source.data.len(),
                grid.nx(),
                grid.ny()
            ))
        })?;

        let source_points = request
            .transform
            .inverse_points(&request.target_grid.points())?;

        let x0 = grid.x()[0];
        let y0 = grid.y()[0];
        let size = grid.cell_size();
        let nodata = request.nodata;
        let method = request.interpolation;

        let sample_at = |&(x, y): &(f64, f64)| -> f32 {
            if !x.is_finite() || !y.is_finite() {
                return nodata;
            }
            // y decreases with row
            let col = (x - x0) / size;
            let row = (y0 - y) / size;
            sample(&view, method, col, row).unwrap_or(nodata)
        };

        let output: Vec<f32> = if self.parallel {
            source_points.par_iter().map(sample_at).collect()
        } else {
            source_points.iter().map(sample_at).collect()
        };

        let filled = output.iter().filter(|&&v| v != nodata).count();
        debug!(
            cells = output.len(),
            filled,
            method = %method,
            "Warped raster onto target grid"
        );
        Ok(output)
    }
}
