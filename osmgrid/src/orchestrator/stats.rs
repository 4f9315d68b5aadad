//! Run-level download statistics.

use super::types::{FetchOutcome, FetchStatus};
use std::fmt;
use std::time::Duration;

/// Summary of one fetch run.
///
/// # Example
///
/// ```
/// use osmgrid::orchestrator::DownloadStats;
/// use std::time::Duration;
///
/// let stats = DownloadStats::from_outcomes(&[], Duration::from_secs(1));
/// assert_eq!(stats.total, 0);
/// assert_eq!(stats.bytes_per_second(), 0.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DownloadStats {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub cancelled: usize,
    pub bytes: u64,
    pub elapsed: Duration,
}

impl DownloadStats {
    /// Tallies a set of outcomes.
    pub fn from_outcomes(outcomes: &[FetchOutcome], elapsed: Duration) -> Self {
        let mut stats = Self {
            total: outcomes.len(),
            elapsed,
            ..Self::default()
        };

        for outcome in outcomes {
            match &outcome.status {
                FetchStatus::Downloaded { bytes } => {
                    stats.succeeded += 1;
                    stats.bytes += bytes;
                }
                FetchStatus::Failed { .. } => stats.failed += 1,
                FetchStatus::Cancelled => stats.cancelled += 1,
            }
        }

        stats
    }

    /// Average throughput over the whole run.
    pub fn bytes_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.bytes as f64 / secs
        } else {
            0.0
        }
    }
}

impl fmt::Display for DownloadStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} tiles downloaded, {} failed, {} cancelled, {} bytes in {:.1}s",
            self.succeeded,
            self.total,
            self.failed,
            self.cancelled,
            self.bytes,
            self.elapsed.as_secs_f64()
        )
    }
}
