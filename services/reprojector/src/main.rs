//! ITS_LIVE velocity granule reprojector.
//!
//! Reads a granule, moves it into another EPSG projection with velocity
//! components re-expressed in the destination frame, and writes the result
//! as JSON:
//! - Destination grid at the source resolution
//! - Per-cell transforms estimated from the projection itself
//! - NODATA statistics printed on completion

mod config;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use projection::Proj4Transform;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use velocity_common::EpsgCode;
use velocity_reproject::{
    InterpolationMethod, InverseMappingWarp, ReprojectionStats, Reprojector, VelocityGranule,
};

use config::{load_config, CliOverrides};

#[derive(Parser, Debug)]
#[command(name = "reprojector")]
#[command(about = "Reproject ITS_LIVE velocity granules between map projections")]
struct Args {
    /// Input granule (JSON, or NetCDF when built with the netcdf feature)
    #[arg(short, long)]
    input: PathBuf,

    /// Destination projection (e.g. 3413 or EPSG:3413)
    #[arg(short, long)]
    projection: String,

    /// Output granule path (JSON)
    #[arg(short, long)]
    output: PathBuf,

    /// Warp interpolation: nearest, bilinear or cubic
    #[arg(long)]
    interpolation: Option<InterpolationMethod>,

    /// Degeneracy tolerance in degrees
    #[arg(long)]
    angle_tolerance: Option<f64>,

    /// Process cells on a single thread
    #[arg(long)]
    sequential: bool,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args.log_level, args.json_logs)?;

    let config = load_config(&CliOverrides {
        interpolation: args.interpolation,
        angle_tolerance: args.angle_tolerance,
        sequential: args.sequential,
    })?;

    let target: EpsgCode = args
        .projection
        .parse()
        .with_context(|| format!("Invalid destination projection '{}'", args.projection))?;

    let granule = load_granule(&args.input)?;
    info!(
        input = %args.input.display(),
        source = %granule.epsg,
        target = %target,
        "Starting reprojection"
    );

    let transform = Proj4Transform::new(granule.epsg, target)
        .with_context(|| format!("Cannot transform {} -> {}", granule.epsg, target))?;
    let warp = InverseMappingWarp::new(config.parallel);

    let reprojector =
        Reprojector::new(&granule, config).context("Granule cannot be reprojected")?;
    let output = reprojector
        .run(&transform, &warp)
        .with_context(|| format!("Reprojection {} -> {} failed", granule.epsg, target))?;

    output
        .granule
        .save_json(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    println!("{}", summary(&output.stats));
    Ok(())
}

fn init_tracing(log_level: &str, json: bool) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

fn load_granule(path: &Path) -> Result<VelocityGranule> {
    let is_netcdf = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("nc"));

    if is_netcdf {
        return load_netcdf(path);
    }
    VelocityGranule::load_json(path)
        .with_context(|| format!("Failed to read granule {}", path.display()))
}

#[cfg(feature = "netcdf")]
fn load_netcdf(path: &Path) -> Result<VelocityGranule> {
    VelocityGranule::load_netcdf(path)
        .with_context(|| format!("Failed to read NetCDF granule {}", path.display()))
}

#[cfg(not(feature = "netcdf"))]
fn load_netcdf(path: &Path) -> Result<VelocityGranule> {
    anyhow::bail!(
        "{} is NetCDF; rebuild with --features netcdf to read it",
        path.display()
    )
}

fn summary(stats: &ReprojectionStats) -> String {
    format!(
        "{} cells, {} valid, {} NODATA ({:.2}%): out_of_extent={} degenerate_basis={} degenerate_geometry={} singular={}",
        stats.total_cells,
        stats.valid_cells,
        stats.nodata_cells(),
        stats.nodata_fraction() * 100.0,
        stats.out_of_extent,
        stats.degenerate_basis,
        stats.degenerate_geometry,
        stats.singular_transform,
    )
}
