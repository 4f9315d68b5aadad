//! Map data fetching.
//!
//! The [`TileFetcher`] trait is the seam between the orchestrator and the
//! network. [`HttpTileFetcher`] is the production implementation; tests
//! substitute their own fetchers.
//!
//! # Example
//!
//! ```ignore
//! use osmgrid::coord::BoundingBox;
//! use osmgrid::provider::{HttpTileFetcher, TileFetcher, DEFAULT_ENDPOINT};
//! use std::path::Path;
//!
//! let fetcher = HttpTileFetcher::new(DEFAULT_ENDPOINT)?;
//! let bbox = BoundingBox::new(40.6920, 40.6881, -74.0423, -74.0485);
//! let bytes = fetcher.fetch(&bbox, Path::new("tile_0.osm")).await?;
//! ```

mod http;
mod types;

pub use http::{
    map_url, HttpTileFetcher, COORDINATE_PRECISION, DEFAULT_ENDPOINT, DEFAULT_FETCH_TIMEOUT_SECS,
    DEFAULT_USER_AGENT,
};
pub use types::{FetchError, TileFetcher};

use std::path::Path;
use tracing::debug;

/// Truncates a partially written tile file to zero length.
///
/// Best effort: a missing file is left missing and errors are only logged.
pub async fn discard_partial(path: &Path) {
    let result = tokio::fs::OpenOptions::new()
        .write(true)
        .truncate(true)
        .open(path)
        .await;

    if let Err(e) = result {
        if e.kind() != std::io::ErrorKind::NotFound {
            debug!(path = %path.display(), error = %e, "Failed to truncate partial tile");
        }
    }
}
