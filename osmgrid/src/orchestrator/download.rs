//! Tile fetch orchestration implementation

use super::stats::DownloadStats;
use super::types::{FetchOutcome, FetchProgressCallback, FetchStatus, RunReport};
use crate::config::DownloadConfig;
use crate::coord::{BoundingBox, TileDimensions};
use crate::grid::{partition, GridError, TileSpec};
use crate::provider::{discard_partial, FetchError, TileFetcher};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Fetches every tile of a partitioned bounding box with bounded concurrency.
///
/// Tasks are spawned only while fewer than `parallel_downloads` fetches are
/// in flight, so a large grid never turns into thousands of waiting tasks.
/// Each task carries its traversal slot and results are reassembled by slot,
/// so the report is in grid order whatever order fetches complete in.
///
/// # Example
///
/// ```ignore
/// use osmgrid::config::DownloadConfig;
/// use osmgrid::coord::{BoundingBox, TileDimensions};
/// use osmgrid::orchestrator::TileOrchestrator;
/// use osmgrid::provider::{HttpTileFetcher, DEFAULT_ENDPOINT};
/// use std::sync::Arc;
///
/// let fetcher = Arc::new(HttpTileFetcher::new(DEFAULT_ENDPOINT)?);
/// let orchestrator = TileOrchestrator::new(fetcher, DownloadConfig::default(), ".");
/// let bbox = BoundingBox::new(40.6920, 40.6881, -74.0423, -74.0485);
/// let report = orchestrator.run(&bbox, TileDimensions::new(0.005, 0.003)).await?;
/// ```
pub struct TileOrchestrator<F> {
    fetcher: Arc<F>,
    config: DownloadConfig,
    work_dir: PathBuf,
    progress: Option<FetchProgressCallback>,
}

impl<F: TileFetcher + 'static> TileOrchestrator<F> {
    /// Creates an orchestrator writing tile files into `work_dir`.
    pub fn new(fetcher: Arc<F>, config: DownloadConfig, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            fetcher,
            config,
            work_dir: work_dir.into(),
            progress: None,
        }
    }

    /// Reports every finished fetch to `callback` while the run is going.
    pub fn with_progress(mut self, callback: FetchProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    pub fn fetcher(&self) -> &Arc<F> {
        &self.fetcher
    }

    pub fn config(&self) -> &DownloadConfig {
        &self.config
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Partitions `bbox` and fetches every tile.
    ///
    /// Fails only when the partition is invalid; per-tile failures are
    /// recorded in the report.
    pub async fn run(
        &self,
        bbox: &BoundingBox,
        dims: TileDimensions,
    ) -> Result<RunReport, GridError> {
        self.run_cancellable(bbox, dims, CancellationToken::new())
            .await
    }

    /// Like [`run`](Self::run), stopping early when `token` is cancelled.
    ///
    /// After cancellation no new fetch is started. Fetches already in flight
    /// run to completion (bounded by the per-fetch timeout) and tiles that
    /// never started are reported as [`FetchStatus::Cancelled`].
    pub async fn run_cancellable(
        &self,
        bbox: &BoundingBox,
        dims: TileDimensions,
        token: CancellationToken,
    ) -> Result<RunReport, GridError> {
        let tiles = partition(bbox, dims)?;
        Ok(self.fetch_tiles(&tiles, token).await)
    }

    /// Fetches `tiles` in the given order.
    pub async fn fetch_tiles(&self, tiles: &[TileSpec], token: CancellationToken) -> RunReport {
        let start = Instant::now();
        let total = tiles.len();
        let parallel = self.config.parallel_downloads();
        let timeout = self.config.timeout();
        let timeout_secs = self.config.timeout_secs();

        info!(
            fetcher = self.fetcher.name(),
            tiles = total,
            parallel,
            timeout_secs,
            work_dir = %self.work_dir.display(),
            "Starting tile fetch"
        );

        let tile_paths: Vec<PathBuf> = tiles.iter().map(|t| t.path_in(&self.work_dir)).collect();
        let mut slots: Vec<Option<FetchStatus>> = (0..total).map(|_| None).collect();
        let mut started = vec![false; total];
        let mut pending: VecDeque<usize> = (0..total).collect();
        let mut in_flight: JoinSet<(usize, Result<u64, FetchError>)> = JoinSet::new();

        loop {
            // Top up to the concurrency limit
            while in_flight.len() < parallel && !token.is_cancelled() {
                let Some(slot) = pending.pop_front() else {
                    break;
                };
                let tile = &tiles[slot];
                let fetcher = Arc::clone(&self.fetcher);
                let bbox = *tile.bbox();
                let path = tile_paths[slot].clone();

                debug!(tile = tile.filename(), index = tile.index(), "Spawning fetch");
                started[slot] = true;

                in_flight.spawn(async move {
                    let result = match tokio::time::timeout(timeout, fetcher.fetch(&bbox, &path))
                        .await
                    {
                        Ok(result) => result,
                        Err(_) => {
                            discard_partial(&path).await;
                            Err(FetchError::Timeout(timeout_secs))
                        }
                    };
                    (slot, result)
                });
            }

            if in_flight.is_empty() {
                break;
            }

            tokio::select! {
                biased;

                _ = token.cancelled(), if !pending.is_empty() => {
                    debug!(
                        pending = pending.len(),
                        active = in_flight.len(),
                        "Fetch cancelled - no further tiles will start"
                    );
                    for slot in pending.drain(..) {
                        slots[slot] = Some(FetchStatus::Cancelled);
                    }
                }

                joined = in_flight.join_next() => {
                    match joined {
                        Some(Ok((slot, result))) => {
                            let status = record_result(&tiles[slot], result);
                            if let Some(progress) = &self.progress {
                                progress(&FetchOutcome {
                                    index: tiles[slot].index(),
                                    filename: tiles[slot].filename().to_string(),
                                    path: tile_paths[slot].clone(),
                                    status: status.clone(),
                                });
                            }
                            slots[slot] = Some(status);
                        }
                        Some(Err(join_err)) => {
                            warn!(error = %join_err, "Fetch task panicked");
                        }
                        None => {}
                    }
                }
            }
        }

        let outcomes: Vec<FetchOutcome> = tiles
            .iter()
            .zip(tile_paths.iter())
            .zip(slots)
            .enumerate()
            .map(|(slot, ((tile, path), status))| FetchOutcome {
                index: tile.index(),
                filename: tile.filename().to_string(),
                path: path.clone(),
                status: status.unwrap_or_else(|| unfinished_status(started[slot])),
            })
            .collect();

        let stats = DownloadStats::from_outcomes(&outcomes, start.elapsed());
        let cancelled = token.is_cancelled() && stats.cancelled > 0;

        info!(
            succeeded = stats.succeeded,
            failed = stats.failed,
            cancelled = stats.cancelled,
            bytes = stats.bytes,
            elapsed_ms = stats.elapsed.as_millis() as u64,
            "Tile fetch complete"
        );

        RunReport {
            tile_paths,
            outcomes,
            stats,
            cancelled,
        }
    }
}

/// Logs one status line for a finished fetch and converts it to a status.
fn record_result(tile: &TileSpec, result: Result<u64, FetchError>) -> FetchStatus {
    match result {
        Ok(bytes) => {
            info!(tile = tile.filename(), index = tile.index(), bytes, "Downloaded tile");
            FetchStatus::Downloaded { bytes }
        }
        Err(error) if error.is_transfer_error() => {
            warn!(
                tile = tile.filename(),
                index = tile.index(),
                error = %error,
                "Failed to download tile"
            );
            FetchStatus::Failed { error }
        }
        Err(error) => {
            // Local I/O problems usually hit every tile, not just this one
            error!(
                tile = tile.filename(),
                index = tile.index(),
                error = %error,
                "Failed to store tile"
            );
            FetchStatus::Failed { error }
        }
    }
}

/// Status for a slot that never reported back.
fn unfinished_status(started: bool) -> FetchStatus {
    if started {
        FetchStatus::Failed {
            error: FetchError::Transfer("fetch task aborted".to_string()),
        }
    } else {
        FetchStatus::Cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use tempfile::TempDir;

    fn tile_number(path: &Path) -> usize {
        path.file_stem()
            .and_then(|s| s.to_str())
            .and_then(|s| s.strip_prefix("tile_"))
            .and_then(|s| s.parse().ok())
            .unwrap()
    }

    /// Writes a small payload; fails for configured tile numbers; earlier
    /// tiles take longer so completion order is reversed.
    struct MockFetcher {
        calls: AtomicUsize,
        active: AtomicUsize,
        max_active: AtomicUsize,
        failing: Vec<usize>,
        completed: Mutex<Vec<usize>>,
        delay_step_ms: u64,
        tile_count: usize,
    }

    impl MockFetcher {
        fn new(tile_count: usize) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                active: AtomicUsize::new(0),
                max_active: AtomicUsize::new(0),
                failing: Vec::new(),
                completed: Mutex::new(Vec::new()),
                delay_step_ms: 25,
                tile_count,
            }
        }

        fn failing(mut self, tiles: &[usize]) -> Self {
            self.failing = tiles.to_vec();
            self
        }
    }

    impl TileFetcher for MockFetcher {
        async fn fetch(&self, _bbox: &BoundingBox, destination: &Path) -> Result<u64, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_active.fetch_max(now, Ordering::SeqCst);

            let n = tile_number(destination);
            let delay = (self.tile_count - n) as u64 * self.delay_step_ms;
            tokio::time::sleep(Duration::from_millis(delay)).await;

            let result = if self.failing.contains(&n) {
                std::fs::write(destination, "").unwrap();
                Err(FetchError::HttpStatus {
                    status: 509,
                    url: "http://mock".to_string(),
                })
            } else {
                let body = format!("<osm tile=\"{}\"/>", n);
                std::fs::write(destination, &body).unwrap();
                Ok(body.len() as u64)
            };

            self.completed.lock().unwrap().push(n);
            self.active.fetch_sub(1, Ordering::SeqCst);
            result
        }

        fn name(&self) -> &str {
            "mock"
        }
    }

    fn two_by_two() -> (BoundingBox, TileDimensions) {
        (
            BoundingBox::new(1.0, 0.0, 1.0, 0.0),
            TileDimensions::new(0.5, 0.5),
        )
    }

    #[tokio::test]
    async fn test_paths_in_grid_order_despite_reverse_completion() {
        let dir = TempDir::new().unwrap();
        let fetcher = Arc::new(MockFetcher::new(4));
        let config = DownloadConfig::new().with_parallel_downloads(4);
        let orchestrator = TileOrchestrator::new(Arc::clone(&fetcher), config, dir.path());

        let (bbox, dims) = two_by_two();
        let report = orchestrator.run(&bbox, dims).await.unwrap();

        let completed = fetcher.completed.lock().unwrap().clone();
        assert_eq!(completed, vec![3, 2, 1, 0]);

        let expected: Vec<PathBuf> = (0..4)
            .map(|i| dir.path().join(format!("tile_{}.osm", i)))
            .collect();
        assert_eq!(report.tile_paths, expected);
        let indices: Vec<usize> = report.outcomes.iter().map(|o| o.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
        assert!(report.outcomes.iter().all(|o| o.success()));
        assert!(!report.cancelled);
    }

    #[tokio::test]
    async fn test_progress_reported_as_fetches_finish() {
        let dir = TempDir::new().unwrap();
        let fetcher = Arc::new(MockFetcher::new(4).failing(&[2]));
        let seen: Arc<Mutex<Vec<(usize, bool)>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let orchestrator = TileOrchestrator::new(
            Arc::clone(&fetcher),
            DownloadConfig::new().with_parallel_downloads(4),
            dir.path(),
        )
        .with_progress(Arc::new(move |outcome: &FetchOutcome| {
            sink.lock().unwrap().push((outcome.index, outcome.success()));
        }));

        let (bbox, dims) = two_by_two();
        orchestrator.run(&bbox, dims).await.unwrap();

        // Completion order, not grid order
        let seen = seen.lock().unwrap().clone();
        assert_eq!(seen, vec![(3, true), (2, false), (1, true), (0, true)]);
    }

    #[tokio::test]
    async fn test_failed_tile_still_listed() {
        let dir = TempDir::new().unwrap();
        let fetcher = Arc::new(MockFetcher::new(2).failing(&[1]));
        let orchestrator =
            TileOrchestrator::new(Arc::clone(&fetcher), DownloadConfig::default(), dir.path());

        let bbox = BoundingBox::new(1.0, 0.0, 1.0, 0.0);
        let report = orchestrator
            .run(&bbox, TileDimensions::new(0.5, 1.0))
            .await
            .unwrap();

        assert_eq!(report.tile_paths.len(), 2);
        assert_eq!(report.tile_paths[1], dir.path().join("tile_1.osm"));
        assert!(report.outcomes[0].success());
        assert!(!report.outcomes[1].success());
        assert_eq!(report.stats.failed, 1);
        assert_eq!(report.failures().count(), 1);
    }

    #[tokio::test]
    async fn test_counts_match_tiles_when_all_fail() {
        let dir = TempDir::new().unwrap();
        let fetcher = Arc::new(MockFetcher::new(4).failing(&[0, 1, 2, 3]));
        let orchestrator =
            TileOrchestrator::new(Arc::clone(&fetcher), DownloadConfig::default(), dir.path());

        let (bbox, dims) = two_by_two();
        let report = orchestrator.run(&bbox, dims).await.unwrap();

        assert_eq!(report.tile_count(), 4);
        assert_eq!(report.outcomes.len(), 4);
        assert_eq!(report.stats.failed, 4);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_concurrency_limit_respected() {
        let dir = TempDir::new().unwrap();
        let fetcher = Arc::new(MockFetcher::new(12));
        let config = DownloadConfig::new().with_parallel_downloads(3);
        let orchestrator = TileOrchestrator::new(Arc::clone(&fetcher), config, dir.path());

        let bbox = BoundingBox::new(1.0, 0.0, 1.2, 0.0);
        let report = orchestrator
            .run(&bbox, TileDimensions::new(0.1, 1.0))
            .await
            .unwrap();

        assert_eq!(report.tile_count(), 12);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 12);
        let max_active = fetcher.max_active.load(Ordering::SeqCst);
        assert!(max_active <= 3, "max in flight was {}", max_active);
        assert!(max_active >= 2);
    }

    #[tokio::test]
    async fn test_empty_box_fetches_nothing() {
        let dir = TempDir::new().unwrap();
        let fetcher = Arc::new(MockFetcher::new(0));
        let orchestrator =
            TileOrchestrator::new(Arc::clone(&fetcher), DownloadConfig::default(), dir.path());

        let inverted = BoundingBox::new(0.0, 1.0, 1.0, 0.0);
        let report = orchestrator
            .run(&inverted, TileDimensions::new(0.5, 0.5))
            .await
            .unwrap();

        assert!(report.tile_paths.is_empty());
        assert!(report.outcomes.is_empty());
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalid_dimensions_rejected_before_fetch() {
        let dir = TempDir::new().unwrap();
        let fetcher = Arc::new(MockFetcher::new(0));
        let orchestrator =
            TileOrchestrator::new(Arc::clone(&fetcher), DownloadConfig::default(), dir.path());

        let (bbox, _) = two_by_two();
        let result = orchestrator.run(&bbox, TileDimensions::new(0.0, 0.5)).await;

        assert!(matches!(result, Err(GridError::InvalidDimensions { .. })));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }

    /// Cancels the shared token during its first fetch.
    struct CancellingFetcher {
        token: CancellationToken,
        calls: AtomicUsize,
    }

    impl TileFetcher for CancellingFetcher {
        async fn fetch(&self, _bbox: &BoundingBox, destination: &Path) -> Result<u64, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.token.cancel();
            std::fs::write(destination, "<osm/>").unwrap();
            Ok(6)
        }

        fn name(&self) -> &str {
            "cancelling"
        }
    }

    #[tokio::test]
    async fn test_cancellation_stops_new_fetches() {
        let dir = TempDir::new().unwrap();
        let token = CancellationToken::new();
        let fetcher = Arc::new(CancellingFetcher {
            token: token.clone(),
            calls: AtomicUsize::new(0),
        });
        let config = DownloadConfig::new().with_parallel_downloads(1);
        let orchestrator = TileOrchestrator::new(Arc::clone(&fetcher), config, dir.path());

        let (bbox, dims) = two_by_two();
        let report = orchestrator
            .run_cancellable(&bbox, dims, token)
            .await
            .unwrap();

        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
        assert!(report.cancelled);
        assert_eq!(report.tile_paths.len(), 4);
        assert!(report.outcomes[0].success());
        assert!(report.outcomes[1..].iter().all(|o| o.is_cancelled()));
        assert_eq!(report.stats.cancelled, 3);
    }

    #[tokio::test]
    async fn test_already_cancelled_token_starts_nothing() {
        let dir = TempDir::new().unwrap();
        let fetcher = Arc::new(MockFetcher::new(4));
        let orchestrator =
            TileOrchestrator::new(Arc::clone(&fetcher), DownloadConfig::default(), dir.path());
        let token = CancellationToken::new();
        token.cancel();

        let (bbox, dims) = two_by_two();
        let report = orchestrator
            .run_cancellable(&bbox, dims, token)
            .await
            .unwrap();

        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
        assert!(report.cancelled);
        assert!(report.outcomes.iter().all(|o| o.is_cancelled()));
    }

    /// Writes a partial payload and then stalls.
    struct StallingFetcher;

    impl TileFetcher for StallingFetcher {
        async fn fetch(&self, _bbox: &BoundingBox, destination: &Path) -> Result<u64, FetchError> {
            std::fs::write(destination, "<osm><node").unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(0)
        }

        fn name(&self) -> &str {
            "stalling"
        }
    }

    #[tokio::test]
    async fn test_timeout_discards_partial_payload() {
        let dir = TempDir::new().unwrap();
        let config = DownloadConfig::new().with_timeout_secs(1);
        let orchestrator = TileOrchestrator::new(Arc::new(StallingFetcher), config, dir.path());

        let bbox = BoundingBox::new(1.0, 0.0, 1.0, 0.0);
        let report = orchestrator
            .run(&bbox, TileDimensions::new(1.0, 1.0))
            .await
            .unwrap();

        assert_eq!(
            report.outcomes[0].error(),
            Some(&FetchError::Timeout(1))
        );
        let path = &report.tile_paths[0];
        assert!(path.exists());
        assert_eq!(std::fs::metadata(path).unwrap().len(), 0);
    }
}
