//! osmgrid CLI - Command-line interface
//!
//! This binary provides a command-line interface to the osmgrid library.
//! Without a subcommand it extracts an area; `osmgrid config` manages the
//! configuration file.

mod commands;
mod error;
mod runner;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::common::ExtractArgs;
use commands::config::ConfigCommands;

#[derive(Parser)]
#[command(name = "osmgrid")]
#[command(version)]
#[command(
    about = "Download an OpenStreetMap area tile by tile and merge the tiles into one file",
    long_about = None
)]
struct Cli {
    /// Config file to use instead of ~/.osmgrid/config.ini
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging (also mirrored to stderr)
    #[arg(long, global = true)]
    debug: bool,

    #[command(flatten)]
    extract: ExtractArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    let result = match cli.command {
        Some(Commands::Config { command }) => commands::config::run(command, config_path),
        None => commands::extract::run(cli.extract, config_path, cli.debug).await,
    };

    if let Err(e) = result {
        e.exit();
    }
}
