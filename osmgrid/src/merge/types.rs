//! Merge types and traits

use std::future::Future;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors returned by a [`TileMerger`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MergeError {
    /// The merge program could not be started
    #[error("Failed to start '{command}': {reason}")]
    Spawn { command: String, reason: String },

    /// The merge program ran but reported failure
    #[error("'{command}' exited with {}: {stderr}", describe_exit(.code))]
    ExitStatus {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("status {}", c),
        None => "signal".to_string(),
    }
}

/// Combines tile files into a single output file.
pub trait TileMerger: Send + Sync {
    /// Merges `inputs`, in the given order, into `output`.
    fn merge(
        &self,
        inputs: &[PathBuf],
        output: &Path,
    ) -> impl Future<Output = Result<(), MergeError>> + Send;

    /// Returns the merger's name for logging and identification.
    fn name(&self) -> &str;
}

/// Outcome of a merge step.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeResult {
    /// The requested output file
    pub output: PathBuf,
    /// Whether the merger reported success
    pub success: bool,
    /// Failure description when `success` is false
    pub error: Option<String>,
}

impl MergeResult {
    pub fn succeeded(output: PathBuf) -> Self {
        Self {
            output,
            success: true,
            error: None,
        }
    }

    pub fn failed(output: PathBuf, error: impl Into<String>) -> Self {
        Self {
            output,
            success: false,
            error: Some(error.into()),
        }
    }
}
