//! End-to-end reprojection of one granule.
//!
//! Every stage returns a value consumed by the next; nothing is carried
//! between runs. The coordinate transform and the raster warp are injected
//! so either can be replaced with a deterministic double.

use projection::CoordinateTransform;
use tracing::{debug, info, instrument, warn};
use velocity_common::{BoundingBox, RegularGrid};

use crate::apply::{apply_transforms, speed};
use crate::basis::estimate_local_basis;
use crate::bounds::{source_bounding_box, target_bounding_box, CellSize};
use crate::config::ReprojectConfig;
use crate::error::{ReprojectError, Result};
use crate::granule::VelocityGranule;
use crate::matrix::{build_transforms, MatrixParams};
use crate::types::{ReprojectionStats, TransformField};
use crate::warp::{RasterWarp, SourceRaster, WarpRequest};

/// Destination footprint of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetPlan {
    /// Cell-boundary box in P_out.
    pub bbox: BoundingBox,
    /// Destination cell centers.
    pub grid: RegularGrid,
}

impl TargetPlan {
    /// Plan covering `bbox` at `cell_size`.
    pub fn new(bbox: BoundingBox, cell_size: f64) -> Result<Self> {
        let grid = RegularGrid::from_bounds(&bbox, cell_size)?;
        Ok(Self { bbox, grid })
    }
}

/// Result of a run.
#[derive(Debug, Clone)]
pub struct ReprojectionOutput {
    /// Granule in the destination CRS.
    pub granule: VelocityGranule,
    pub stats: ReprojectionStats,
    /// Per-cell transforms, aligned with the output grid.
    pub transforms: TransformField,
}

/// Reprojects one granule.
///
/// Construction validates the global inputs (configuration, data shapes,
/// square cells) so a malformed granule fails before any transform call.
#[derive(Debug)]
pub struct Reprojector<'a> {
    granule: &'a VelocityGranule,
    config: ReprojectConfig,
    cell: CellSize,
    source_grid: RegularGrid,
    source_bbox: BoundingBox,
}

impl<'a> Reprojector<'a> {
    pub fn new(granule: &'a VelocityGranule, config: ReprojectConfig) -> Result<Self> {
        config.validate()?;
        let cell = granule.cell_size()?;
        let source_bbox = source_bounding_box(&granule.x, &granule.y, cell.dx, cell.dy)?;
        granule.validate()?;
        let source_grid = granule.grid()?;

        info!(
            epsg = %granule.epsg,
            nx = source_grid.nx(),
            ny = source_grid.ny(),
            cell_size = cell.size(),
            bbox = %source_bbox,
            "Prepared source granule"
        );

        Ok(Self {
            granule,
            config,
            cell,
            source_grid,
            source_bbox,
        })
    }

    pub fn config(&self) -> &ReprojectConfig {
        &self.config
    }

    pub fn cell_size(&self) -> CellSize {
        self.cell
    }

    /// Cell-boundary box of the source granule in P_in.
    pub fn source_bbox(&self) -> &BoundingBox {
        &self.source_bbox
    }

    /// Destination box and grid for `transform`, at the source resolution.
    pub fn plan(&self, transform: &dyn CoordinateTransform) -> Result<TargetPlan> {
        self.check_crs(transform)?;
        let bbox = target_bounding_box(&self.source_bbox, transform, self.cell.size())?;
        let plan = TargetPlan::new(bbox, self.cell.size())?;
        info!(
            target = %transform.target_crs(),
            nx = plan.grid.nx(),
            ny = plan.grid.ny(),
            bbox = %plan.bbox,
            "Planned destination grid"
        );
        Ok(plan)
    }

    /// Per-cell velocity transforms over a destination plan.
    pub fn transformation_matrix(
        &self,
        plan: &TargetPlan,
        transform: &dyn CoordinateTransform,
    ) -> Result<TransformField> {
        self.check_crs(transform)?;
        if plan.grid.is_empty() {
            return Err(ReprojectError::EmptyGrid("destination grid".to_string()));
        }

        let basis = estimate_local_basis(
            &plan.grid.points(),
            transform,
            self.cell,
            self.config.parallel,
        )?;
        let params = MatrixParams::new(self.cell, &self.config);
        Ok(build_transforms(
            &basis,
            &self.source_bbox,
            &params,
            self.config.parallel,
        ))
    }

    /// Plan the destination grid and reproject onto it.
    pub fn run(
        &self,
        transform: &dyn CoordinateTransform,
        warp: &dyn RasterWarp,
    ) -> Result<ReprojectionOutput> {
        let plan = self.plan(transform)?;
        self.run_with_plan(&plan, transform, warp)
    }

    /// Reproject onto a caller-supplied destination plan.
    ///
    /// The warp and the matrix construction only meet at the final per-cell
    /// multiply, so they run concurrently.
    #[instrument(skip_all, fields(source = %transform.source_crs(), target = %transform.target_crs()))]
    pub fn run_with_plan(
        &self,
        plan: &TargetPlan,
        transform: &dyn CoordinateTransform,
        warp: &dyn RasterWarp,
    ) -> Result<ReprojectionOutput> {
        self.check_crs(transform)?;

        let (transforms, warped) = rayon::join(
            || self.transformation_matrix(plan, transform),
            || self.warp_components(plan, transform, warp),
        );
        let transforms = transforms?;
        let warped = warped?;

        let nodata = self.config.nodata_value;
        let (vx, vy) = apply_transforms(&transforms.cells, &warped.vx, &warped.vy, nodata);
        let projected = warped
            .projected
            .map(|(vxp, vyp)| apply_transforms(&transforms.cells, &vxp, &vyp, nodata));

        let v = speed(&vx, &vy, nodata);
        let vp = projected.as_ref().map(|(vxp, vyp)| speed(vxp, vyp, nodata));
        let (vxp, vyp) = projected.unzip();

        let stats = transforms.stats;
        self.report(&stats);

        let granule = VelocityGranule {
            x: plan.grid.x().to_vec(),
            y: plan.grid.y().to_vec(),
            epsg: transform.target_crs(),
            nodata,
            vx,
            vy,
            vxp,
            vyp,
            v: Some(v),
            vp,
        };

        Ok(ReprojectionOutput {
            granule,
            stats,
            transforms,
        })
    }

    fn warp_components(
        &self,
        plan: &TargetPlan,
        transform: &dyn CoordinateTransform,
        warp: &dyn RasterWarp,
    ) -> Result<WarpedComponents> {
        let request = WarpRequest {
            transform,
            target_grid: &plan.grid,
            interpolation: self.config.interpolation,
            nodata: self.config.nodata_value,
        };
        let warp_one = |data: &[f32]| -> Result<Vec<f32>> {
            let source = SourceRaster {
                grid: &self.source_grid,
                data,
                nodata: self.granule.nodata,
            };
            let out = warp.warp(&source, &request)?;
            if out.len() != plan.grid.len() {
                return Err(ReprojectError::warp(format!(
                    "warp returned {} values for {} destination cells",
                    out.len(),
                    plan.grid.len()
                )));
            }
            Ok(out)
        };

        let vx = warp_one(&self.granule.vx)?;
        let vy = warp_one(&self.granule.vy)?;
        let projected = match (&self.granule.vxp, &self.granule.vyp) {
            (Some(vxp), Some(vyp)) => Some((warp_one(vxp)?, warp_one(vyp)?)),
            _ => None,
        };

        debug!(
            cells = plan.grid.len(),
            projected = projected.is_some(),
            interpolation = %self.config.interpolation,
            "Warped velocity components"
        );
        Ok(WarpedComponents { vx, vy, projected })
    }

    fn check_crs(&self, transform: &dyn CoordinateTransform) -> Result<()> {
        if transform.source_crs() != self.granule.epsg {
            return Err(ReprojectError::CrsMismatch {
                granule: self.granule.epsg,
                transform: transform.source_crs(),
            });
        }
        Ok(())
    }

    fn report(&self, stats: &ReprojectionStats) {
        let fraction = stats.nodata_fraction();
        info!(
            total = stats.total_cells,
            valid = stats.valid_cells,
            out_of_extent = stats.out_of_extent,
            degenerate_basis = stats.degenerate_basis,
            degenerate_geometry = stats.degenerate_geometry,
            singular = stats.singular_transform,
            nodata_pct = format!("{:.2}", fraction * 100.0),
            "Reprojection complete"
        );
        if fraction > self.config.nodata_warn_fraction {
            warn!(
                nodata_pct = format!("{:.2}", fraction * 100.0),
                threshold_pct = format!("{:.2}", self.config.nodata_warn_fraction * 100.0),
                "Most destination cells have no data"
            );
        }
    }
}

struct WarpedComponents {
    vx: Vec<f32>,
    vy: Vec<f32>,
    projected: Option<(Vec<f32>, Vec<f32>)>,
}
