//! Removal of intermediate tile files.
//!
//! Cleanup is a batch of independent attempts: every path is tried exactly
//! once, in order, and a failure on one path never stops the others.

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Capability to delete a file.
pub trait FileRemover: Send + Sync {
    fn remove(&self, path: &Path) -> impl Future<Output = io::Result<()>> + Send;
}

/// Removes files from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsRemover;

impl FileRemover for FsRemover {
    async fn remove(&self, path: &Path) -> io::Result<()> {
        tokio::fs::remove_file(path).await
    }
}

/// Result of one removal attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanupOutcome {
    pub path: PathBuf,
    pub removed: bool,
    pub error: Option<String>,
}

/// Runs removal attempts over a list of paths.
pub struct CleanupCoordinator<R> {
    remover: R,
}

impl<R: FileRemover> CleanupCoordinator<R> {
    pub fn new(remover: R) -> Self {
        Self { remover }
    }

    pub fn remover(&self) -> &R {
        &self.remover
    }

    /// Attempts to remove each path once and returns one outcome per path,
    /// in input order.
    pub async fn cleanup(&self, paths: &[PathBuf]) -> Vec<CleanupOutcome> {
        let mut outcomes = Vec::with_capacity(paths.len());

        for path in paths {
            let outcome = match self.remover.remove(path).await {
                Ok(()) => {
                    info!(path = %path.display(), "Removed tile file");
                    CleanupOutcome {
                        path: path.clone(),
                        removed: true,
                        error: None,
                    }
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to remove tile file");
                    CleanupOutcome {
                        path: path.clone(),
                        removed: false,
                        error: Some(e.to_string()),
                    }
                }
            };
            outcomes.push(outcome);
        }

        let removed = outcomes.iter().filter(|o| o.removed).count();
        if removed < outcomes.len() {
            warn!(
                removed,
                failed = outcomes.len() - removed,
                "Cleanup finished with failures"
            );
        }

        outcomes
    }
}
