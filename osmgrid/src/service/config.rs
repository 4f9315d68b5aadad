//! Service configuration types.

use crate::config::{ConfigFile, DownloadConfig};
use crate::merge::DEFAULT_MERGE_COMMAND;
use crate::provider::{DEFAULT_ENDPOINT, DEFAULT_USER_AGENT};
use std::path::{Path, PathBuf};

/// Configuration for the extract service.
///
/// Holds everything needed to wire the production components: where to
/// fetch from, how to fetch, how to merge and where files go.
///
/// # Example
///
/// ```
/// use osmgrid::config::DownloadConfig;
/// use osmgrid::service::ServiceConfig;
///
/// let config = ServiceConfig::builder()
///     .endpoint("http://localhost:3000/api/0.6/map")
///     .download(DownloadConfig::new().with_parallel_downloads(2))
///     .work_dir("/tmp/extract")
///     .build();
///
/// assert_eq!(config.download().parallel_downloads(), 2);
/// assert_eq!(config.merge_command(), "osmconvert");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    endpoint: String,
    user_agent: String,
    download: DownloadConfig,
    merge_command: String,
    work_dir: PathBuf,
}

impl ServiceConfig {
    /// Create a new configuration builder.
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder::default()
    }

    /// Build a configuration from the values of a config file.
    pub fn from_config_file(config: &ConfigFile) -> Self {
        Self::builder()
            .endpoint(config.api.endpoint.clone())
            .user_agent(config.api.user_agent.clone())
            .download(config.download_config())
            .merge_command(config.merge.command.clone())
            .work_dir(config.output.directory.clone())
            .build()
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn download(&self) -> &DownloadConfig {
        &self.download
    }

    pub fn merge_command(&self) -> &str {
        &self.merge_command
    }

    /// Directory receiving tile files and the merged output.
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Builder for ServiceConfig.
#[derive(Debug, Clone, Default)]
pub struct ServiceConfigBuilder {
    endpoint: Option<String>,
    user_agent: Option<String>,
    download: Option<DownloadConfig>,
    merge_command: Option<String>,
    work_dir: Option<PathBuf>,
}

impl ServiceConfigBuilder {
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn download(mut self, config: DownloadConfig) -> Self {
        self.download = Some(config);
        self
    }

    pub fn merge_command(mut self, command: impl Into<String>) -> Self {
        self.merge_command = Some(command.into());
        self
    }

    pub fn work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = Some(dir.into());
        self
    }

    /// Build the configuration, filling unset values with defaults.
    pub fn build(self) -> ServiceConfig {
        ServiceConfig {
            endpoint: self
                .endpoint
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            user_agent: self
                .user_agent
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            download: self.download.unwrap_or_default(),
            merge_command: self
                .merge_command
                .unwrap_or_else(|| DEFAULT_MERGE_COMMAND.to_string()),
            work_dir: self.work_dir.unwrap_or_else(|| PathBuf::from(".")),
        }
    }
}
