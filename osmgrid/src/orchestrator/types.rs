//! Orchestrator result types

use super::stats::DownloadStats;
use crate::provider::FetchError;
use std::path::PathBuf;
use std::sync::Arc;

/// Callback invoked once for every fetch as it finishes.
///
/// Calls arrive in completion order, not grid order. Tiles that never
/// started because of cancellation are not reported here.
pub type FetchProgressCallback = Arc<dyn Fn(&FetchOutcome) + Send + Sync>;

/// Final state of one tile's fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchStatus {
    /// Payload written to disk
    Downloaded { bytes: u64 },
    /// Fetch attempted and failed
    Failed { error: FetchError },
    /// Never started because the run was cancelled
    Cancelled,
}

/// Per-tile record produced by the orchestrator.
///
/// The status is informational only; it never decides whether the tile's
/// path is handed to the merge step.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    pub index: usize,
    pub filename: String,
    pub path: PathBuf,
    pub status: FetchStatus,
}

impl FetchOutcome {
    /// Whether the tile's payload was downloaded.
    pub fn success(&self) -> bool {
        matches!(self.status, FetchStatus::Downloaded { .. })
    }

    pub fn bytes(&self) -> u64 {
        match self.status {
            FetchStatus::Downloaded { bytes } => bytes,
            _ => 0,
        }
    }

    pub fn error(&self) -> Option<&FetchError> {
        match &self.status {
            FetchStatus::Failed { error } => Some(error),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == FetchStatus::Cancelled
    }
}

/// Everything a fetch run produced.
///
/// `tile_paths` and `outcomes` both follow grid traversal order and hold one
/// entry per tile, whatever happened to the individual fetches.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub tile_paths: Vec<PathBuf>,
    pub outcomes: Vec<FetchOutcome>,
    pub stats: DownloadStats,
    pub cancelled: bool,
}

impl RunReport {
    pub fn tile_count(&self) -> usize {
        self.tile_paths.len()
    }

    /// Outcomes whose fetch failed.
    pub fn failures(&self) -> impl Iterator<Item = &FetchOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, FetchStatus::Failed { .. }))
    }
}
