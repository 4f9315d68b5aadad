//! osmgrid - Grid-partitioned OpenStreetMap extracts
//!
//! The OSM map API refuses requests covering too large an area. This library
//! splits a bounding box into a grid of small tiles, fetches each tile
//! concurrently, merges the tile files with an external tool and removes
//! the intermediates.
//!
//! # High-Level API
//!
//! For most use cases, the [`service`] module provides a simplified facade:
//!
//! ```ignore
//! use osmgrid::coord::{BoundingBox, TileDimensions};
//! use osmgrid::service::{ExtractRequest, ExtractService, ServiceConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! let service = ExtractService::new(&ServiceConfig::default())?;
//! let request = ExtractRequest::new(
//!     BoundingBox::new(40.6920, 40.6881, -74.0423, -74.0485),
//!     TileDimensions::new(0.005, 0.003),
//! );
//! let report = service.run(&request, CancellationToken::new()).await?;
//! println!("{}", report.run.stats);
//! ```

pub mod cleanup;
pub mod config;
pub mod coord;
pub mod grid;
pub mod logging;
pub mod merge;
pub mod orchestrator;
pub mod provider;
pub mod service;

/// Version of the osmgrid library and CLI.
///
/// This is synchronized across all components in the workspace.
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
