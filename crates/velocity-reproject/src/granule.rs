//! ITS_LIVE velocity granule model and JSON persistence.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tracing::info;
use velocity_common::{EpsgCode, RegularGrid};

use crate::bounds::CellSize;
use crate::config::DEFAULT_NODATA;
use crate::error::{ReprojectError, Result};

fn default_nodata() -> f32 {
    DEFAULT_NODATA
}

/// A gridded velocity product in a single projection.
///
/// `x` holds cell centers west to east, `y` holds cell centers north to
/// south (so `dy < 0`), and every data array is row-major with the
/// northernmost row first. Velocities are in m/yr.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VelocityGranule {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    /// Projection of `x` / `y` (the `spatial_epsg` grid attribute).
    pub epsg: EpsgCode,
    #[serde(default = "default_nodata")]
    pub nodata: f32,
    pub vx: Vec<f32>,
    pub vy: Vec<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vxp: Option<Vec<f32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vyp: Option<Vec<f32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub v: Option<Vec<f32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vp: Option<Vec<f32>>,
}

impl VelocityGranule {
    /// Create a granule with `vx` / `vy` only.
    pub fn new(x: Vec<f64>, y: Vec<f64>, epsg: EpsgCode, vx: Vec<f32>, vy: Vec<f32>) -> Self {
        Self {
            x,
            y,
            epsg,
            nodata: DEFAULT_NODATA,
            vx,
            vy,
            vxp: None,
            vyp: None,
            v: None,
            vp: None,
        }
    }

    /// Attach `vxp` / `vyp`.
    pub fn with_projected_velocity(mut self, vxp: Vec<f32>, vyp: Vec<f32>) -> Self {
        self.vxp = Some(vxp);
        self.vyp = Some(vyp);
        self
    }

    pub fn nx(&self) -> usize {
        self.x.len()
    }

    pub fn ny(&self) -> usize {
        self.y.len()
    }

    /// Signed cell size from the first two coordinates of each axis.
    pub fn cell_size(&self) -> Result<CellSize> {
        CellSize::from_axes(&self.x, &self.y)
    }

    /// Cell-center grid of the granule.
    pub fn grid(&self) -> Result<RegularGrid> {
        Ok(RegularGrid::from_centers(self.x.clone(), self.y.clone())?)
    }

    /// Check that every data array matches the grid shape.
    pub fn validate(&self) -> Result<()> {
        let expected = self.nx() * self.ny();
        let arrays = [
            ("vx", Some(&self.vx)),
            ("vy", Some(&self.vy)),
            ("vxp", self.vxp.as_ref()),
            ("vyp", self.vyp.as_ref()),
            ("v", self.v.as_ref()),
            ("vp", self.vp.as_ref()),
        ];

        for (name, values) in arrays {
            if let Some(values) = values {
                if values.len() != expected {
                    return Err(ReprojectError::invalid_granule(format!(
                        "{name} has {} values, expected {}x{} = {expected}",
                        values.len(),
                        self.nx(),
                        self.ny()
                    )));
                }
            }
        }

        if self.vxp.is_some() != self.vyp.is_some() {
            return Err(ReprojectError::invalid_granule(
                "vxp and vyp must be present together",
            ));
        }

        Ok(())
    }

    /// Read a granule from a JSON file.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let granule: Self = serde_json::from_reader(reader)?;
        granule.validate()?;
        info!(
            path = %path.display(),
            epsg = %granule.epsg,
            nx = granule.nx(),
            ny = granule.ny(),
            "Loaded granule"
        );
        Ok(granule)
    }

    /// Write the granule to a JSON file.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(writer, self)?;
        info!(path = %path.display(), epsg = %self.epsg, "Wrote granule");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_granule() -> VelocityGranule {
        VelocityGranule::new(
            vec![120.0, 360.0],
            vec![360.0, 120.0],
            EpsgCode::new(32622),
            vec![1.0, 2.0, 3.0, 4.0],
            vec![-1.0, -2.0, -3.0, -4.0],
        )
    }

    #[test]
    fn test_validate_shapes() {
        let granule = small_granule();
        assert!(granule.validate().is_ok());

        let mut bad = small_granule();
        bad.vy.pop();
        assert!(matches!(bad.validate(), Err(ReprojectError::InvalidGranule(_))));

        let mut half = small_granule();
        half.vxp = Some(vec![0.0; 4]);
        assert!(half.validate().is_err());
    }

    #[test]
    fn test_cell_size_and_grid() {
        let granule = small_granule();
        let cell = granule.cell_size().unwrap();
        assert_eq!((cell.dx, cell.dy), (240.0, -240.0));

        let grid = granule.grid().unwrap();
        assert_eq!(grid.len(), 4);
        assert_eq!(grid.cell_size(), 240.0);
    }

    #[test]
    fn test_json_defaults_nodata() {
        let json = r#"{"x":[0.0,240.0],"y":[240.0,0.0],"epsg":3413,
            "vx":[1,2,3,4],"vy":[1,2,3,4]}"#;
        let granule: VelocityGranule = serde_json::from_str(json).unwrap();
        assert_eq!(granule.nodata, -32767.0);
        assert_eq!(granule.epsg, EpsgCode::POLAR_NORTH);
        assert!(granule.vxp.is_none());
    }
}
