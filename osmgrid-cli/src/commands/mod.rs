//! CLI command implementations.
//!
//! # Command Modules
//!
//! - [`extract`] - Main command (partition, fetch, merge, clean up)
//! - [`config`] - Configuration management (init, path, show)
//! - [`common`] - Argument definitions and CLI/config resolution

pub mod common;
pub mod config;
pub mod extract;
