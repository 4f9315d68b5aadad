//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;
use osmgrid::config::ConfigFileError;
use osmgrid::grid::GridError;
use osmgrid::service::ServiceError;

/// CLI-specific errors with user-friendly messages.
///
/// Only setup problems are errors. Tile fetch, merge and cleanup failures
/// are reported on stdout and never change the exit code.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Invalid command-line value
    Validation(String),
    /// Failed to create service
    ServiceCreation(ServiceError),
    /// Extraction could not run
    Extract(ServiceError),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Config(_) => {
                eprintln!();
                eprintln!("Run 'osmgrid config show' to see the effective settings,");
                eprintln!("or 'osmgrid config init --force' to reset the file.");
            }
            CliError::Extract(ServiceError::Grid(GridError::TooManyTiles { .. })) => {
                eprintln!();
                eprintln!("Increase --width/--height or request a smaller area.");
            }
            CliError::ServiceCreation(_) => {
                eprintln!();
                eprintln!("The HTTP client could not be created. Check the [api] section");
                eprintln!("of your config file.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Validation(msg) => write!(f, "Invalid argument: {}", msg),
            CliError::ServiceCreation(e) => write!(f, "Failed to create service: {}", e),
            CliError::Extract(e) => write!(f, "Extraction failed: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::ServiceCreation(e) => Some(e),
            CliError::Extract(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<ServiceError> for CliError {
    fn from(e: ServiceError) -> Self {
        CliError::Extract(e)
    }
}
