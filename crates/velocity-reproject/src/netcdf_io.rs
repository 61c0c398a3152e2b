//! Reading ITS_LIVE NetCDF granules.
//!
//! Requires the `netcdf` feature (libnetcdf and libhdf5 at build time).

use std::path::Path;
use tracing::{debug, info};
use velocity_common::EpsgCode;

use crate::config::DEFAULT_NODATA;
use crate::error::{ReprojectError, Result};
use crate::granule::VelocityGranule;

/// Grid-mapping variables that may carry `spatial_epsg`.
const MAPPING_VARIABLES: [&str; 2] = ["mapping", "UTM_Projection"];

impl VelocityGranule {
    /// Read `x`, `y`, `vx`, `vy` and, when present, `vxp` / `vyp` from an
    /// ITS_LIVE NetCDF granule.
    pub fn load_netcdf(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = netcdf::open(path)
            .map_err(|e| ReprojectError::Format(format!("Failed to open NetCDF: {}", e)))?;

        let x = read_f64(&file, "x")?;
        let y = read_f64(&file, "y")?;
        let epsg = read_epsg(&file)?;

        let vx_var = require(&file, "vx")?;
        let nodata = get_f64_attr(&vx_var, "_FillValue")
            .map(|v| v as f32)
            .unwrap_or(DEFAULT_NODATA);

        let mut granule = VelocityGranule::new(x, y, epsg, read_f32(&file, "vx")?, read_f32(&file, "vy")?);
        granule.nodata = nodata;

        if file.variable("vxp").is_some() && file.variable("vyp").is_some() {
            granule.vxp = Some(read_f32(&file, "vxp")?);
            granule.vyp = Some(read_f32(&file, "vyp")?);
        } else {
            debug!(path = %path.display(), "Granule has no vxp/vyp");
        }

        granule.validate()?;
        info!(
            path = %path.display(),
            epsg = %granule.epsg,
            nx = granule.nx(),
            ny = granule.ny(),
            "Loaded NetCDF granule"
        );
        Ok(granule)
    }
}

fn require<'f>(file: &'f netcdf::File, name: &str) -> Result<netcdf::Variable<'f>> {
    file.variable(name)
        .ok_or_else(|| ReprojectError::invalid_granule(format!("missing {} variable", name)))
}

fn read_f64(file: &netcdf::File, name: &str) -> Result<Vec<f64>> {
    require(file, name)?
        .get_values::<f64, _>(..)
        .map_err(|e| ReprojectError::Format(format!("Failed to read {}: {}", name, e)))
}

fn read_f32(file: &netcdf::File, name: &str) -> Result<Vec<f32>> {
    require(file, name)?
        .get_values::<f32, _>(..)
        .map_err(|e| ReprojectError::Format(format!("Failed to read {}: {}", name, e)))
}

fn read_epsg(file: &netcdf::File) -> Result<EpsgCode> {
    for name in MAPPING_VARIABLES {
        let Some(var) = file.variable(name) else {
            continue;
        };
        if let Some(code) = get_f64_attr(&var, "spatial_epsg") {
            return Ok(EpsgCode::new(code as u32));
        }
        if let Some(code) = get_string_attr(&var, "spatial_epsg") {
            return code
                .parse()
                .map_err(|e| ReprojectError::invalid_granule(format!("spatial_epsg: {}", e)));
        }
    }
    Err(ReprojectError::invalid_granule(
        "no spatial_epsg attribute on mapping or UTM_Projection",
    ))
}

/// Checking first avoids HDF5 error output for absent attributes.
fn has_attr(var: &netcdf::Variable, name: &str) -> bool {
    var.attributes().any(|attr| attr.name() == name)
}

fn get_f64_attr(var: &netcdf::Variable, name: &str) -> Option<f64> {
    if !has_attr(var, name) {
        return None;
    }
    let attr_value = var.attribute_value(name)?.ok()?;
    f64::try_from(attr_value).ok()
}

fn get_string_attr(var: &netcdf::Variable, name: &str) -> Option<String> {
    if !has_attr(var, name) {
        return None;
    }
    match var.attribute_value(name)?.ok()? {
        netcdf::AttributeValue::Str(s) => Some(s),
        _ => None,
    }
}
