use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::types::{MergeResult, TileMerger};

/// Drives a [`TileMerger`] and turns its result into a [`MergeResult`].
///
/// Merging is best effort: failures are logged and reported, never returned
/// as errors, so the pipeline continues to cleanup.
pub struct MergeCoordinator<M> {
    merger: M,
}

impl<M: TileMerger> MergeCoordinator<M> {
    pub fn new(merger: M) -> Self {
        Self { merger }
    }

    pub fn merger(&self) -> &M {
        &self.merger
    }

    /// Merges `inputs` in the given order into `output`.
    ///
    /// An empty input list is handed to the merger unchanged.
    pub async fn merge(&self, inputs: &[PathBuf], output: &Path) -> MergeResult {
        info!(
            merger = self.merger.name(),
            tiles = inputs.len(),
            output = %output.display(),
            "Merging tiles"
        );

        match self.merger.merge(inputs, output).await {
            Ok(()) => {
                info!(output = %output.display(), "Merge succeeded");
                MergeResult::succeeded(output.to_path_buf())
            }
            Err(e) => {
                warn!(output = %output.display(), error = %e, "Merge failed");
                MergeResult::failed(output.to_path_buf(), e.to_string())
            }
        }
    }
}
