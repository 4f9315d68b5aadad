//! Service error types.

use crate::grid::GridError;
use crate::provider::FetchError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop an extraction before or instead of running it.
///
/// Per-tile fetch failures, merge failures and cleanup failures are not
/// errors at this level; they are reported in the
/// [`ExtractReport`](super::ExtractReport).
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The grid could not be partitioned
    #[error("Invalid grid: {0}")]
    Grid(#[from] GridError),

    /// The fetcher could not be constructed
    #[error("HTTP client error: {0}")]
    HttpClient(FetchError),

    /// The merged output would be named like a tile and removed by cleanup
    #[error("Output '{}' is named like a tile file and would be removed after merging", path.display())]
    OutputIsTileFile { path: PathBuf },

    /// The working directory could not be prepared
    #[error("Cannot prepare output directory '{}': {source}", path.display())]
    OutputDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
