//! Common types and utilities shared across CLI commands.
//!
//! Every setting is resolved the same way: command-line value first, then
//! the config file, which already carries the built-in defaults.

use clap::Args;
use osmgrid::config::{ConfigFile, MAX_PARALLEL_DOWNLOADS, MIN_PARALLEL_DOWNLOADS};
use osmgrid::coord::{BoundingBox, TileDimensions, MAX_LAT, MAX_LON, MIN_LAT, MIN_LON};
use osmgrid::service::{ExtractRequest, ServiceConfig};
use std::path::PathBuf;
use tracing::warn;

use crate::error::CliError;

/// Arguments of the extraction run (the default command).
#[derive(Debug, Clone, Default, Args)]
pub struct ExtractArgs {
    /// Tile width in decimal degrees of longitude
    #[arg(long)]
    pub width: Option<f64>,

    /// Tile height in decimal degrees of latitude
    #[arg(long)]
    pub height: Option<f64>,

    /// Northern edge of the area
    #[arg(short = 'n', long, allow_negative_numbers = true)]
    pub north: Option<f64>,

    /// Eastern edge of the area
    #[arg(short = 'e', long, allow_negative_numbers = true)]
    pub east: Option<f64>,

    /// Southern edge of the area
    #[arg(short = 's', long, allow_negative_numbers = true)]
    pub south: Option<f64>,

    /// Western edge of the area
    #[arg(short = 'w', long, allow_negative_numbers = true)]
    pub west: Option<f64>,

    /// Merged output filename (relative to the output directory)
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Directory receiving tile files and the merged output
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Number of tiles fetched at once (1-64)
    #[arg(long)]
    pub parallel: Option<usize>,

    /// Timeout in seconds for a single tile fetch
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Map API endpoint
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Program used to merge tile files
    #[arg(long)]
    pub merge_command: Option<String>,

    /// Keep tile files after merging
    #[arg(long)]
    pub keep_tiles: bool,

    /// Print the tile plan without downloading anything
    #[arg(long)]
    pub dry_run: bool,
}

/// Resolve the bounding box from CLI and config.
pub fn resolve_bbox(args: &ExtractArgs, config: &ConfigFile) -> Result<BoundingBox, CliError> {
    let bbox = BoundingBox::new(
        args.north.unwrap_or(config.bbox.north),
        args.south.unwrap_or(config.bbox.south),
        args.east.unwrap_or(config.bbox.east),
        args.west.unwrap_or(config.bbox.west),
    );

    if !bbox.is_finite() {
        return Err(CliError::Validation(format!(
            "bounding box {} must have finite edges",
            bbox
        )));
    }
    if let Some(message) = world_bounds_warning(&bbox) {
        warn!(bbox = %bbox, "{}", message);
        eprintln!("Warning: {}", message);
    }
    Ok(bbox)
}

/// Describes a box reaching past valid coordinates, which the map API
/// will reject.
pub fn world_bounds_warning(bbox: &BoundingBox) -> Option<String> {
    if bbox.is_within_world() {
        return None;
    }
    Some(format!(
        "bounding box {} extends beyond latitude {}..{} / longitude {}..{}",
        bbox, MIN_LAT, MAX_LAT, MIN_LON, MAX_LON
    ))
}

/// Resolve the tile dimensions from CLI and config.
pub fn resolve_dimensions(
    args: &ExtractArgs,
    config: &ConfigFile,
) -> Result<TileDimensions, CliError> {
    let dims = TileDimensions::new(
        args.width.unwrap_or(config.grid.tile_width),
        args.height.unwrap_or(config.grid.tile_height),
    );

    if !dims.is_valid() {
        return Err(CliError::Validation(format!(
            "tile size {} is invalid: --width and --height must be greater than zero",
            dims
        )));
    }
    Ok(dims)
}

/// Resolve the service wiring from CLI and config.
pub fn resolve_service_config(
    args: &ExtractArgs,
    config: &ConfigFile,
) -> Result<ServiceConfig, CliError> {
    let mut download = config.download_config();

    if let Some(parallel) = args.parallel {
        if !(MIN_PARALLEL_DOWNLOADS..=MAX_PARALLEL_DOWNLOADS).contains(&parallel) {
            return Err(CliError::Validation(format!(
                "--parallel must be between {} and {}",
                MIN_PARALLEL_DOWNLOADS, MAX_PARALLEL_DOWNLOADS
            )));
        }
        download = download.with_parallel_downloads(parallel);
    }
    if let Some(timeout) = args.timeout {
        if timeout == 0 {
            return Err(CliError::Validation(
                "--timeout must be at least 1 second".to_string(),
            ));
        }
        download = download.with_timeout_secs(timeout);
    }

    Ok(ServiceConfig::builder()
        .endpoint(
            args.endpoint
                .clone()
                .unwrap_or_else(|| config.api.endpoint.clone()),
        )
        .user_agent(config.api.user_agent.clone())
        .download(download)
        .merge_command(
            args.merge_command
                .clone()
                .unwrap_or_else(|| config.merge.command.clone()),
        )
        .work_dir(
            args.output_dir
                .clone()
                .unwrap_or_else(|| config.output.directory.clone()),
        )
        .build())
}

/// Resolve the extraction request from CLI and config.
pub fn resolve_request(args: &ExtractArgs, config: &ConfigFile) -> Result<ExtractRequest, CliError> {
    let bbox = resolve_bbox(args, config)?;
    let dims = resolve_dimensions(args, config)?;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.merge.output));

    Ok(ExtractRequest::new(bbox, dims)
        .with_output(output)
        .with_keep_tiles(args.keep_tiles || config.output.keep_tiles))
}
