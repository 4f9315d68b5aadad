//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.
//! These are pure data types with no parsing or serialization logic.

use crate::coord::{BoundingBox, TileDimensions};
use std::path::PathBuf;

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    /// Map API settings
    pub api: ApiSettings,
    /// Default tile size
    pub grid: GridSettings,
    /// Default bounding box
    pub bbox: BboxSettings,
    /// Fetch concurrency and timeout
    pub download: DownloadSettings,
    /// External merge tool
    pub merge: MergeSettings,
    /// Working directory and tile retention
    pub output: OutputSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

/// Map API configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiSettings {
    /// Base endpoint; `?bbox=...` is appended per tile
    pub endpoint: String,
    /// User-Agent header sent with every request
    pub user_agent: String,
}

/// Grid configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct GridSettings {
    /// Tile width in degrees of longitude
    pub tile_width: f64,
    /// Tile height in degrees of latitude
    pub tile_height: f64,
}

impl GridSettings {
    /// Tile dimensions described by these settings.
    pub fn dimensions(&self) -> TileDimensions {
        TileDimensions::new(self.tile_width, self.tile_height)
    }
}

/// Default area to extract.
#[derive(Debug, Clone, PartialEq)]
pub struct BboxSettings {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl BboxSettings {
    /// Bounding box described by these settings.
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::new(self.north, self.south, self.east, self.west)
    }
}

/// Download configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadSettings {
    /// Timeout in seconds for a single tile fetch
    pub timeout: u64,
    /// Maximum number of fetches in flight
    pub parallel: usize,
}

/// Merge tool configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeSettings {
    /// Program invoked to merge tiles (e.g. `osmconvert`)
    pub command: String,
    /// Merged output filename, relative to the output directory
    pub output: String,
}

/// Output configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSettings {
    /// Directory receiving tile files and the merged output
    pub directory: PathBuf,
    /// Keep tile files after merging instead of deleting them
    pub keep_tiles: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Log file path (default: ~/.osmgrid/osmgrid.log)
    pub file: PathBuf,
}
