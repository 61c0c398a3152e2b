//! Run configuration: environment first, then command-line overrides.

use anyhow::{Context, Result};
use tracing::debug;
use velocity_reproject::{InterpolationMethod, ReprojectConfig};

/// Values given on the command line. `None` keeps the environment value.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub interpolation: Option<InterpolationMethod>,
    pub angle_tolerance: Option<f64>,
    pub sequential: bool,
}

/// Build the reprojection config from `REPROJECT_*` variables and `overrides`.
pub fn load_config(overrides: &CliOverrides) -> Result<ReprojectConfig> {
    let config = apply_overrides(ReprojectConfig::from_env(), overrides);
    config.validate().context("Invalid reprojection configuration")?;
    debug!(?config, "Loaded configuration");
    Ok(config)
}

fn apply_overrides(mut config: ReprojectConfig, overrides: &CliOverrides) -> ReprojectConfig {
    if let Some(method) = overrides.interpolation {
        config.interpolation = method;
    }
    if let Some(tolerance) = overrides.angle_tolerance {
        config.angle_tolerance_deg = tolerance;
    }
    if overrides.sequential {
        config.parallel = false;
    }
    config
}
