//! Configuration types for osmgrid components.
//!
//! Two layers live here:
//!
//! - [`ConfigFile`]: the user's `~/.osmgrid/config.ini`, one settings struct
//!   per INI section. Missing files and missing keys fall back to defaults.
//! - [`DownloadConfig`]: the typed parameters handed to the fetch orchestrator.
//!
//! # Example
//!
//! ```
//! use osmgrid::config::{ConfigFile, DownloadConfig};
//!
//! let config = ConfigFile::default();
//! assert_eq!(config.grid.tile_width, 0.005);
//!
//! let download: DownloadConfig = config.download_config();
//! assert_eq!(download.parallel_downloads(), 4);
//! ```

mod defaults;
mod download;
mod file;
mod parser;
mod settings;
mod writer;

pub use defaults::{
    DEFAULT_DOWNLOAD_TIMEOUT_SECS, DEFAULT_EAST, DEFAULT_LOG_FILE, DEFAULT_MERGE_OUTPUT,
    DEFAULT_NORTH, DEFAULT_PARALLEL_DOWNLOADS, DEFAULT_SOUTH, DEFAULT_TILE_HEIGHT,
    DEFAULT_TILE_WIDTH, DEFAULT_WEST, MAX_PARALLEL_DOWNLOADS, MIN_PARALLEL_DOWNLOADS,
};
pub use download::DownloadConfig;
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{
    ApiSettings, BboxSettings, ConfigFile, DownloadSettings, GridSettings, LoggingSettings,
    MergeSettings, OutputSettings,
};
