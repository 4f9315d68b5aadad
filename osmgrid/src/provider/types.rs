//! Fetcher types and traits

use crate::coord::BoundingBox;
use std::future::Future;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while fetching a single tile.
///
/// Every variant is per-tile and non-fatal: the orchestrator records it in
/// the tile's outcome and carries on with the remaining tiles.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    /// The HTTP client could not be constructed
    #[error("Failed to create HTTP client: {0}")]
    ClientInit(String),

    /// The destination file could not be created for writing
    #[error("Cannot open '{}' for writing: {reason}", path.display())]
    FileOpen { path: PathBuf, reason: String },

    /// Transport-level failure while sending the request or reading the body
    #[error("Transfer failed: {0}")]
    Transfer(String),

    /// The server answered with a non-success status code
    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    /// The payload could not be written to disk
    #[error("Failed to write '{}': {reason}", path.display())]
    Write { path: PathBuf, reason: String },

    /// The fetch did not complete within the configured timeout
    #[error("Fetch timed out after {0}s")]
    Timeout(u64),
}

impl FetchError {
    /// Returns true for failures that happened on the network side.
    pub fn is_transfer_error(&self) -> bool {
        matches!(
            self,
            FetchError::Transfer(_) | FetchError::HttpStatus { .. } | FetchError::Timeout(_)
        )
    }
}

/// Capability to retrieve the map payload of one tile and persist it.
///
/// Implementors write the payload for `bbox` to `destination`, overwriting
/// any existing content, and return the number of bytes written.
///
/// On failure the destination may remain on disk but must not hold a
/// partially written payload: implementations truncate it (see
/// [`discard_partial`](super::discard_partial)).
pub trait TileFetcher: Send + Sync {
    /// Fetches the payload for `bbox` into `destination`.
    fn fetch(
        &self,
        bbox: &BoundingBox,
        destination: &Path,
    ) -> impl Future<Output = Result<u64, FetchError>> + Send;

    /// Returns the fetcher's name for logging and identification.
    fn name(&self) -> &str;
}
