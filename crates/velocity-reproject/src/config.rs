//! Configuration for the reprojection pipeline.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ReprojectError, Result};
use crate::types::InterpolationMethod;

/// Seconds in one day. Any period works as long as the same one converts
/// velocity to displacement and back when building the cell matrices.
pub const DEFAULT_TIME_DELTA_SECS: f64 = 24.0 * 3600.0;

/// Seconds per year: velocities are stored in m/yr.
pub const SECONDS_PER_YEAR: f64 = 365.0 * 24.0 * 3600.0;

/// ITS_LIVE fill value for unmapped cells.
pub const DEFAULT_NODATA: f32 = -32767.0;

/// Configuration for a reprojection run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReprojectConfig {
    /// Maximum angle in degrees between the local basis normal and the
    /// flat-surface normal before a cell is declared degenerate.
    pub angle_tolerance_deg: f64,

    /// Time base used to express a one-cell step as a rate.
    pub time_delta_secs: f64,

    /// Interpolation method for the raster warp.
    pub interpolation: InterpolationMethod,

    /// Fill value written for NODATA cells.
    pub nodata_value: f32,

    /// Process cells on the rayon thread pool.
    pub parallel: bool,

    /// NODATA fraction above which a run logs a warning.
    pub nodata_warn_fraction: f64,
}

impl Default for ReprojectConfig {
    fn default() -> Self {
        Self {
            angle_tolerance_deg: 1.0,
            time_delta_secs: DEFAULT_TIME_DELTA_SECS,
            interpolation: InterpolationMethod::Bilinear,
            nodata_value: DEFAULT_NODATA,
            parallel: true,
            nodata_warn_fraction: 0.5,
        }
    }
}

impl ReprojectConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("REPROJECT_ANGLE_TOLERANCE_DEG") {
            if let Ok(deg) = val.parse() {
                config.angle_tolerance_deg = deg;
            }
        }

        if let Ok(val) = std::env::var("REPROJECT_TIME_DELTA_SECS") {
            if let Ok(secs) = val.parse() {
                config.time_delta_secs = secs;
            }
        }

        if let Ok(val) = std::env::var("REPROJECT_INTERPOLATION") {
            match val.parse() {
                Ok(method) => config.interpolation = method,
                Err(e) => warn!(error = %e, "Ignoring REPROJECT_INTERPOLATION"),
            }
        }

        if let Ok(val) = std::env::var("REPROJECT_NODATA") {
            if let Ok(nodata) = val.parse() {
                config.nodata_value = nodata;
            }
        }

        if let Ok(val) = std::env::var("REPROJECT_PARALLEL") {
            config.parallel = val.to_lowercase() == "true" || val == "1";
        }

        if let Ok(val) = std::env::var("REPROJECT_NODATA_WARN_FRACTION") {
            if let Ok(fraction) = val.parse() {
                config.nodata_warn_fraction = fraction;
            }
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if !(self.angle_tolerance_deg > 0.0 && self.angle_tolerance_deg < 180.0) {
            return Err(ReprojectError::Config(format!(
                "angle_tolerance_deg must be in (0, 180), got {}",
                self.angle_tolerance_deg
            )));
        }

        if !(self.time_delta_secs.is_finite() && self.time_delta_secs > 0.0) {
            return Err(ReprojectError::Config(format!(
                "time_delta_secs must be > 0, got {}",
                self.time_delta_secs
            )));
        }

        if !(0.0..=1.0).contains(&self.nodata_warn_fraction) {
            return Err(ReprojectError::Config(format!(
                "nodata_warn_fraction must be in [0, 1], got {}",
                self.nodata_warn_fraction
            )));
        }

        Ok(())
    }
}
