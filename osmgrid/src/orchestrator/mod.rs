//! Tile fetch orchestration
//!
//! Partitions a bounding box, fetches every tile with bounded concurrency
//! and reports per-tile outcomes in grid traversal order.

mod download;
mod stats;
mod types;

pub use download::TileOrchestrator;
pub use stats::DownloadStats;
pub use types::{FetchOutcome, FetchProgressCallback, FetchStatus, RunReport};
