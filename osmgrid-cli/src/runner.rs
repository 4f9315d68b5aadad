//! CLI runner for common setup and operations.
//!
//! Encapsulates config loading, logging initialization and service creation
//! to reduce duplication across command handlers.

use crate::error::CliError;
use osmgrid::config::{config_file_path, ConfigFile, DEFAULT_LOG_FILE};
use osmgrid::logging::{init_logging_with, LogOptions, LoggingGuard};
use osmgrid::service::{HttpExtractService, ServiceConfig};
use std::path::{Path, PathBuf};
use tracing::info;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    /// Loaded configuration file
    config: ConfigFile,
    /// Where the configuration was loaded from
    config_path: PathBuf,
}

impl CliRunner {
    /// Create a new CLI runner, loading config and initializing logging.
    ///
    /// # Arguments
    ///
    /// * `config_path` - Config file to load instead of ~/.osmgrid/config.ini
    /// * `debug_mode` - When true, enables debug-level logging regardless of
    ///   RUST_LOG and mirrors log events to stderr
    pub fn new(config_path: Option<&Path>, debug_mode: bool) -> Result<Self, CliError> {
        let config_path = config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(config_file_path);

        // Missing file means defaults
        let config = ConfigFile::load_from(&config_path)?;

        let log_path = &config.logging.file;
        let log_dir = log_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let log_file = log_path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| DEFAULT_LOG_FILE.to_string());

        let options = LogOptions {
            debug: debug_mode,
            console: debug_mode,
        };
        let logging_guard = init_logging_with(&log_dir, &log_file, options)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
            config_path,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("osmgrid v{}", osmgrid::VERSION);
        info!(
            config = %self.config_path.display(),
            "osmgrid CLI: {} command", command
        );
    }

    /// Create the production extract service.
    pub fn create_service(&self, config: &ServiceConfig) -> Result<HttpExtractService, CliError> {
        HttpExtractService::new(config)
            .map_err(CliError::ServiceCreation)
            .inspect(|_| info!(endpoint = config.endpoint(), "Service created successfully"))
    }
}
