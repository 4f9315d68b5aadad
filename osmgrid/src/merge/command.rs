//! Merger backed by an external program.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, trace};

use super::types::{MergeError, TileMerger};

/// Default merge program.
pub const DEFAULT_MERGE_COMMAND: &str = "osmconvert";

/// Runs `<program> <input>... -o=<output>` and waits for it to exit.
///
/// Inputs are passed as separate arguments, so paths with spaces or shell
/// metacharacters reach the program untouched.
#[derive(Debug, Clone)]
pub struct CommandMerger {
    program: String,
}

impl CommandMerger {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments passed to the program for a merge of `inputs` into `output`.
    pub fn arguments(inputs: &[PathBuf], output: &Path) -> Vec<String> {
        inputs
            .iter()
            .map(|p| p.display().to_string())
            .chain(std::iter::once(format!("-o={}", output.display())))
            .collect()
    }
}

impl Default for CommandMerger {
    fn default() -> Self {
        Self::new(DEFAULT_MERGE_COMMAND)
    }
}

impl TileMerger for CommandMerger {
    async fn merge(&self, inputs: &[PathBuf], output: &Path) -> Result<(), MergeError> {
        let args = Self::arguments(inputs, output);
        debug!(program = %self.program, args = args.len(), "Spawning merge program");
        trace!(?args, "Merge arguments");

        let result = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| MergeError::Spawn {
                command: self.program.clone(),
                reason: e.to_string(),
            })?;

        if result.status.success() {
            Ok(())
        } else {
            Err(MergeError::ExitStatus {
                command: self.program.clone(),
                code: result.status.code(),
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            })
        }
    }

    fn name(&self) -> &str {
        &self.program
    }
}
