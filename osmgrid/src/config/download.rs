//! Download/orchestrator configuration.

use super::defaults::{
    DEFAULT_DOWNLOAD_TIMEOUT_SECS, DEFAULT_PARALLEL_DOWNLOADS, MAX_PARALLEL_DOWNLOADS,
    MIN_PARALLEL_DOWNLOADS,
};
use std::time::Duration;

/// Configuration for tile fetching.
///
/// Groups the parameters of the fetch orchestrator, providing sensible
/// defaults while allowing customization.
///
/// # Example
///
/// ```
/// use osmgrid::config::DownloadConfig;
///
/// // Using defaults
/// let config = DownloadConfig::default();
/// assert_eq!(config.timeout_secs(), 60);
/// assert_eq!(config.parallel_downloads(), 4);
///
/// // Custom configuration
/// let config = DownloadConfig::new()
///     .with_timeout_secs(30)
///     .with_parallel_downloads(8);
/// assert_eq!(config.parallel_downloads(), 8);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadConfig {
    /// Maximum time a single tile fetch may take (in seconds)
    timeout_secs: u64,
    /// Maximum number of fetches in flight at once
    parallel_downloads: usize,
}

impl DownloadConfig {
    /// Create a new download configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-fetch timeout in seconds.
    ///
    /// A value of 0 is raised to 1 second. Default: 60 seconds.
    pub fn with_timeout_secs(mut self, timeout: u64) -> Self {
        self.timeout_secs = timeout.max(1);
        self
    }

    /// Set the maximum number of parallel fetches.
    ///
    /// Clamped to `1..=64`. Default: 4.
    pub fn with_parallel_downloads(mut self, parallel: usize) -> Self {
        self.parallel_downloads = parallel.clamp(MIN_PARALLEL_DOWNLOADS, MAX_PARALLEL_DOWNLOADS);
        self
    }

    /// Get the per-fetch timeout in seconds.
    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    /// Get the per-fetch timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get the maximum number of parallel fetches.
    pub fn parallel_downloads(&self) -> usize {
        self.parallel_downloads
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_DOWNLOAD_TIMEOUT_SECS,
            parallel_downloads: DEFAULT_PARALLEL_DOWNLOADS,
        }
    }
}
