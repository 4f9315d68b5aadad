//! Default values and constants for all configuration settings.
//!
//! Contains all `DEFAULT_*` constants and the `ConfigFile::default()`
//! implementation.

use std::path::PathBuf;

use super::file::config_directory;
use super::settings::*;
use crate::merge::DEFAULT_MERGE_COMMAND;
use crate::provider::{DEFAULT_ENDPOINT, DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_USER_AGENT};

// =============================================================================
// Grid
// =============================================================================

/// Default tile width in degrees of longitude.
pub const DEFAULT_TILE_WIDTH: f64 = 0.005;

/// Default tile height in degrees of latitude.
pub const DEFAULT_TILE_HEIGHT: f64 = 0.003;

// Default area: Liberty Island, New York Harbor.
pub const DEFAULT_NORTH: f64 = 40.6920;
pub const DEFAULT_SOUTH: f64 = 40.6881;
pub const DEFAULT_EAST: f64 = -74.0423;
pub const DEFAULT_WEST: f64 = -74.0485;

// =============================================================================
// Download
// =============================================================================

/// Default per-fetch timeout in seconds.
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = DEFAULT_FETCH_TIMEOUT_SECS;

/// Default number of fetches in flight.
pub const DEFAULT_PARALLEL_DOWNLOADS: usize = 4;

pub const MIN_PARALLEL_DOWNLOADS: usize = 1;
pub const MAX_PARALLEL_DOWNLOADS: usize = 64;

// =============================================================================
// Merge / output
// =============================================================================

/// Default merged output filename.
pub const DEFAULT_MERGE_OUTPUT: &str = "merged.osm";

/// Default log filename.
pub const DEFAULT_LOG_FILE: &str = "osmgrid.log";

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            api: ApiSettings {
                endpoint: DEFAULT_ENDPOINT.to_string(),
                user_agent: DEFAULT_USER_AGENT.to_string(),
            },
            grid: GridSettings {
                tile_width: DEFAULT_TILE_WIDTH,
                tile_height: DEFAULT_TILE_HEIGHT,
            },
            bbox: BboxSettings {
                north: DEFAULT_NORTH,
                south: DEFAULT_SOUTH,
                east: DEFAULT_EAST,
                west: DEFAULT_WEST,
            },
            download: DownloadSettings {
                timeout: DEFAULT_DOWNLOAD_TIMEOUT_SECS,
                parallel: DEFAULT_PARALLEL_DOWNLOADS,
            },
            merge: MergeSettings {
                command: DEFAULT_MERGE_COMMAND.to_string(),
                output: DEFAULT_MERGE_OUTPUT.to_string(),
            },
            output: OutputSettings {
                directory: PathBuf::from("."),
                keep_tiles: false,
            },
            logging: LoggingSettings {
                file: config_directory().join(DEFAULT_LOG_FILE),
            },
        }
    }
}
