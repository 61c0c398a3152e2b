//! NetCDF granule input. Needs the `netcdf` feature.
//!
//! Run with: cargo test --package velocity-reproject --features netcdf --test netcdf_tests

#![cfg(feature = "netcdf")]

use std::path::Path;

use projection::Proj4Transform;
use test_utils::fixtures::crs;
use test_utils::require_test_file;
use velocity_common::EpsgCode;
use velocity_reproject::{InverseMappingWarp, ReprojectConfig, Reprojector, VelocityGranule};

const FILL: f32 = -32767.0;

/// Write a 3x2 granule the way ITS_LIVE lays one out: `x`/`y` axes,
/// `vx`/`vy` on `(y, x)` with a fill value and the EPSG code on `mapping`.
fn write_granule(path: &Path, with_projected: bool) {
    let mut file = netcdf::create(path).unwrap();
    file.add_dimension("x", 3).unwrap();
    file.add_dimension("y", 2).unwrap();

    let mut x = file.add_variable::<f64>("x", &["x"]).unwrap();
    x.put_values(&[534_000.0, 534_240.0, 534_480.0], ..).unwrap();
    let mut y = file.add_variable::<f64>("y", &["y"]).unwrap();
    y.put_values(&[7_674_240.0, 7_674_000.0], ..).unwrap();

    let mut names = vec!["vx", "vy"];
    if with_projected {
        names.extend(["vxp", "vyp"]);
    }
    for (k, name) in names.into_iter().enumerate() {
        let mut var = file.add_variable::<f32>(name, &["y", "x"]).unwrap();
        var.set_fill_value(FILL).unwrap();
        let values: Vec<f32> = (0..6).map(|i| (k * 100 + i) as f32).collect();
        var.put_values(&values, ..).unwrap();
    }

    let mut mapping = file.add_variable::<i8>("mapping", &[]).unwrap();
    mapping.put_attribute("spatial_epsg", 32622i32).unwrap();
}

#[test]
fn test_load_written_granule() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("granule.nc");
    write_granule(&path, true);

    let granule = VelocityGranule::load_netcdf(&path).unwrap();

    assert_eq!(granule.epsg, EpsgCode::new(32622));
    assert_eq!(granule.nx(), 3);
    assert_eq!(granule.ny(), 2);
    assert_eq!(granule.nodata, FILL);
    assert_eq!(granule.y, vec![7_674_240.0, 7_674_000.0]);
    assert_eq!(granule.vx, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
    assert_eq!(granule.vy[0], 100.0);
    assert_eq!(granule.vxp.as_ref().map(|v| v[5]), Some(205.0));
    assert_eq!(granule.vyp.as_ref().map(|v| v[0]), Some(300.0));
}

#[test]
fn test_projected_components_are_optional() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("granule.nc");
    write_granule(&path, false);

    let granule = VelocityGranule::load_netcdf(&path).unwrap();
    assert!(granule.vxp.is_none());
    assert!(granule.vyp.is_none());
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(VelocityGranule::load_netcdf(dir.path().join("absent.nc")).is_err());
}

/// A real ITS_LIVE scene pair near Jakobshavn, reprojected to polar
/// stereographic north.
#[test]
fn test_reproject_its_live_granule() {
    let path = require_test_file!("jakobshavn_sample.nc");

    let granule = VelocityGranule::load_netcdf(&path).unwrap();
    let transform = Proj4Transform::new(granule.epsg, crs::POLAR_NORTH).unwrap();
    let reprojector = Reprojector::new(&granule, ReprojectConfig::default()).unwrap();
    let output = reprojector
        .run(&transform, &InverseMappingWarp::new(true))
        .unwrap();

    assert_eq!(output.granule.epsg, crs::POLAR_NORTH);
    assert!(output.stats.valid_cells > 0);
}
