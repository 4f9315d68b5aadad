//! Extract service facade implementation.

use super::config::ServiceConfig;
use super::error::ServiceError;
use crate::cleanup::{CleanupCoordinator, CleanupOutcome, FileRemover, FsRemover};
use crate::config::DownloadConfig;
use crate::coord::{BoundingBox, TileDimensions};
use crate::grid::{is_tile_filename, partition, TileSpec};
use crate::merge::{CommandMerger, MergeCoordinator, MergeResult, TileMerger};
use crate::orchestrator::{FetchProgressCallback, RunReport, TileOrchestrator};
use crate::provider::{HttpTileFetcher, TileFetcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// One extraction: the area, the grid and what to do with the results.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractRequest {
    pub bbox: BoundingBox,
    pub dims: TileDimensions,
    /// Merged output, resolved against the working directory
    pub output: PathBuf,
    /// Skip tile removal after merging
    pub keep_tiles: bool,
}

impl ExtractRequest {
    pub fn new(bbox: BoundingBox, dims: TileDimensions) -> Self {
        Self {
            bbox,
            dims,
            output: PathBuf::from(crate::config::DEFAULT_MERGE_OUTPUT),
            keep_tiles: false,
        }
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    pub fn with_keep_tiles(mut self, keep: bool) -> Self {
        self.keep_tiles = keep;
        self
    }
}

/// Result of a complete extraction.
#[derive(Debug, Clone)]
pub struct ExtractReport {
    pub run: RunReport,
    /// Absent when the run was cancelled
    pub merge: Option<MergeResult>,
    /// Empty when the run was cancelled or tiles were kept
    pub cleanup: Vec<CleanupOutcome>,
}

impl ExtractReport {
    pub fn merged(&self) -> bool {
        self.merge.as_ref().is_some_and(|m| m.success)
    }
}

/// High-level extraction pipeline: partition, fetch, merge, clean up.
///
/// # Example
///
/// ```ignore
/// use osmgrid::coord::{BoundingBox, TileDimensions};
/// use osmgrid::service::{ExtractRequest, ExtractService, ServiceConfig};
/// use tokio_util::sync::CancellationToken;
///
/// let service = ExtractService::new(&ServiceConfig::default())?;
/// let request = ExtractRequest::new(
///     BoundingBox::new(40.6920, 40.6881, -74.0423, -74.0485),
///     TileDimensions::new(0.005, 0.003),
/// );
/// let report = service.run(&request, CancellationToken::new()).await?;
/// ```
pub struct ExtractService<F, M, R> {
    orchestrator: TileOrchestrator<F>,
    merge: MergeCoordinator<M>,
    cleanup: CleanupCoordinator<R>,
}

/// The service wired with the production fetcher, merger and remover.
pub type HttpExtractService = ExtractService<HttpTileFetcher, CommandMerger, FsRemover>;

impl HttpExtractService {
    /// Wires the production components from `config`.
    pub fn new(config: &ServiceConfig) -> Result<Self, ServiceError> {
        let fetcher = HttpTileFetcher::with_options(
            config.endpoint(),
            config.download().timeout(),
            config.user_agent(),
        )
        .map_err(ServiceError::HttpClient)?;

        Ok(Self::with_components(
            Arc::new(fetcher),
            CommandMerger::new(config.merge_command()),
            FsRemover,
            *config.download(),
            config.work_dir(),
        ))
    }
}

impl<F, M, R> ExtractService<F, M, R>
where
    F: TileFetcher + 'static,
    M: TileMerger,
    R: FileRemover,
{
    /// Builds a service from explicit components.
    pub fn with_components(
        fetcher: Arc<F>,
        merger: M,
        remover: R,
        download: DownloadConfig,
        work_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            orchestrator: TileOrchestrator::new(fetcher, download, work_dir),
            merge: MergeCoordinator::new(merger),
            cleanup: CleanupCoordinator::new(remover),
        }
    }

    /// Reports each tile to `callback` as soon as its fetch finishes.
    pub fn with_progress(mut self, callback: FetchProgressCallback) -> Self {
        self.orchestrator = self.orchestrator.with_progress(callback);
        self
    }

    pub fn work_dir(&self) -> &Path {
        self.orchestrator.work_dir()
    }

    pub fn orchestrator(&self) -> &TileOrchestrator<F> {
        &self.orchestrator
    }

    /// Where the merged output of `request` will be written.
    pub fn output_path(&self, request: &ExtractRequest) -> PathBuf {
        self.work_dir().join(&request.output)
    }

    /// Rejects outputs that cleanup would delete along with the tiles.
    fn check_output(&self, request: &ExtractRequest) -> Result<(), ServiceError> {
        let named_like_tile = request
            .output
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(is_tile_filename);

        if named_like_tile {
            return Err(ServiceError::OutputIsTileFile {
                path: self.output_path(request),
            });
        }
        Ok(())
    }

    /// Partitions the request's area without fetching anything.
    pub fn plan(&self, request: &ExtractRequest) -> Result<Vec<TileSpec>, ServiceError> {
        self.check_output(request)?;
        Ok(partition(&request.bbox, request.dims)?)
    }

    /// Runs the full pipeline.
    ///
    /// Fails only on an invalid grid, an output named like a tile file or an
    /// unusable working directory. A cancelled run skips merge and cleanup,
    /// leaving fetched tiles on disk.
    pub async fn run(
        &self,
        request: &ExtractRequest,
        token: CancellationToken,
    ) -> Result<ExtractReport, ServiceError> {
        self.check_output(request)?;

        let work_dir = self.work_dir();
        tokio::fs::create_dir_all(work_dir)
            .await
            .map_err(|source| ServiceError::OutputDirectory {
                path: work_dir.to_path_buf(),
                source,
            })?;

        info!(
            bbox = %request.bbox,
            tile_size = %request.dims,
            "Starting extraction"
        );

        let run = self
            .orchestrator
            .run_cancellable(&request.bbox, request.dims, token)
            .await?;

        if run.cancelled {
            warn!(
                downloaded = run.stats.succeeded,
                cancelled = run.stats.cancelled,
                "Extraction cancelled - skipping merge and cleanup"
            );
            return Ok(ExtractReport {
                run,
                merge: None,
                cleanup: Vec::new(),
            });
        }

        let output = self.output_path(request);
        let merge = self.merge.merge(&run.tile_paths, &output).await;

        let cleanup = if request.keep_tiles {
            info!(tiles = run.tile_paths.len(), "Keeping tile files");
            Vec::new()
        } else {
            self.cleanup.cleanup(&run.tile_paths).await
        };

        Ok(ExtractReport {
            run,
            merge: Some(merge),
            cleanup,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridError;
    use crate::merge::MergeError;
    use crate::provider::FetchError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Writes a payload, or an empty file with an error for failing tiles.
    struct FileFetcher {
        failing: Vec<&'static str>,
        cancel_on_first: Option<CancellationToken>,
        calls: AtomicUsize,
    }

    impl FileFetcher {
        fn new(failing: Vec<&'static str>) -> Self {
            Self {
                failing,
                cancel_on_first: None,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl TileFetcher for FileFetcher {
        async fn fetch(&self, _bbox: &BoundingBox, destination: &Path) -> Result<u64, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(token) = &self.cancel_on_first {
                token.cancel();
            }
            let name = destination.file_name().and_then(|n| n.to_str()).unwrap_or("");
            if self.failing.contains(&name) {
                std::fs::write(destination, "").unwrap();
                return Err(FetchError::Transfer("connection reset".to_string()));
            }
            std::fs::write(destination, "<osm/>").unwrap();
            Ok(6)
        }

        fn name(&self) -> &str {
            "file"
        }
    }

    #[derive(Default)]
    struct RecordingMerger {
        inputs: Mutex<Option<Vec<PathBuf>>>,
        fail: bool,
    }

    impl TileMerger for RecordingMerger {
        async fn merge(&self, inputs: &[PathBuf], output: &Path) -> Result<(), MergeError> {
            *self.inputs.lock().unwrap() = Some(inputs.to_vec());
            if self.fail {
                return Err(MergeError::Spawn {
                    command: "osmconvert".to_string(),
                    reason: "not found".to_string(),
                });
            }
            std::fs::write(output, "<osm merged/>").unwrap();
            Ok(())
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    fn service(
        dir: &Path,
        fetcher: FileFetcher,
        merger: RecordingMerger,
    ) -> ExtractService<FileFetcher, RecordingMerger, FsRemover> {
        ExtractService::with_components(
            Arc::new(fetcher),
            merger,
            FsRemover,
            DownloadConfig::new().with_parallel_downloads(2),
            dir,
        )
    }

    fn two_tile_request() -> ExtractRequest {
        ExtractRequest::new(
            BoundingBox::new(1.0, 0.0, 1.0, 0.0),
            TileDimensions::new(0.5, 1.0),
        )
    }

    #[tokio::test]
    async fn test_failed_tile_is_merged_then_removed() {
        let dir = TempDir::new().unwrap();
        let svc = service(
            dir.path(),
            FileFetcher::new(vec!["tile_1.osm"]),
            RecordingMerger::default(),
        );

        let report = svc.run(&two_tile_request(), CancellationToken::new()).await.unwrap();

        let expected = vec![dir.path().join("tile_0.osm"), dir.path().join("tile_1.osm")];
        let merged_inputs = svc.merge.merger().inputs.lock().unwrap().clone().unwrap();
        assert_eq!(merged_inputs, expected);
        assert!(report.merged());
        assert!(dir.path().join("merged.osm").exists());

        assert_eq!(report.cleanup.len(), 2);
        assert!(report.cleanup.iter().all(|c| c.removed));
        assert!(!expected[0].exists());
        assert!(!expected[1].exists());
    }

    #[tokio::test]
    async fn test_keep_tiles_skips_cleanup() {
        let dir = TempDir::new().unwrap();
        let svc = service(dir.path(), FileFetcher::new(vec![]), RecordingMerger::default());
        let request = two_tile_request().with_keep_tiles(true);

        let report = svc.run(&request, CancellationToken::new()).await.unwrap();

        assert!(report.cleanup.is_empty());
        assert!(dir.path().join("tile_0.osm").exists());
        assert!(dir.path().join("tile_1.osm").exists());
    }

    #[tokio::test]
    async fn test_merge_failure_still_cleans_up() {
        let dir = TempDir::new().unwrap();
        let merger = RecordingMerger {
            fail: true,
            ..RecordingMerger::default()
        };
        let svc = service(dir.path(), FileFetcher::new(vec![]), merger);

        let report = svc.run(&two_tile_request(), CancellationToken::new()).await.unwrap();

        let merge = report.merge.as_ref().unwrap();
        assert!(!merge.success);
        assert!(merge.error.as_deref().unwrap().contains("not found"));
        assert_eq!(report.cleanup.len(), 2);
        assert!(!dir.path().join("tile_0.osm").exists());
    }

    #[tokio::test]
    async fn test_cancelled_run_skips_merge_and_cleanup() {
        let dir = TempDir::new().unwrap();
        let token = CancellationToken::new();
        let mut fetcher = FileFetcher::new(vec![]);
        fetcher.cancel_on_first = Some(token.clone());
        let svc = ExtractService::with_components(
            Arc::new(fetcher),
            RecordingMerger::default(),
            FsRemover,
            DownloadConfig::new().with_parallel_downloads(1),
            dir.path(),
        );
        let request = ExtractRequest::new(
            BoundingBox::new(1.0, 0.0, 1.0, 0.0),
            TileDimensions::new(0.25, 1.0),
        );

        let report = svc.run(&request, token).await.unwrap();

        assert!(report.run.cancelled);
        assert!(report.merge.is_none());
        assert!(report.cleanup.is_empty());
        assert!(svc.merge.merger().inputs.lock().unwrap().is_none());
        assert!(dir.path().join("tile_0.osm").exists());
    }

    #[tokio::test]
    async fn test_invalid_grid_is_an_error() {
        let dir = TempDir::new().unwrap();
        let svc = service(dir.path(), FileFetcher::new(vec![]), RecordingMerger::default());
        let request = ExtractRequest::new(
            BoundingBox::new(1.0, 0.0, 1.0, 0.0),
            TileDimensions::new(-0.5, 1.0),
        );

        let result = svc.run(&request, CancellationToken::new()).await;

        assert!(matches!(
            result,
            Err(ServiceError::Grid(GridError::InvalidDimensions { .. }))
        ));
        assert_eq!(svc.orchestrator().fetcher().calls.load(Ordering::SeqCst), 0);
    }

    /// Finishes later tiles first so completion order is the reverse of
    /// grid order.
    struct ReverseOrderFetcher {
        tile_count: usize,
        completed: Mutex<Vec<String>>,
    }

    impl TileFetcher for ReverseOrderFetcher {
        async fn fetch(&self, _bbox: &BoundingBox, destination: &Path) -> Result<u64, FetchError> {
            let name = destination
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("")
                .to_string();
            let n: usize = name
                .trim_start_matches("tile_")
                .trim_end_matches(".osm")
                .parse()
                .unwrap();

            let delay = (self.tile_count - n) as u64 * 30;
            tokio::time::sleep(std::time::Duration::from_millis(delay)).await;

            std::fs::write(destination, format!("<osm tile=\"{}\"/>", n)).unwrap();
            self.completed.lock().unwrap().push(name);
            Ok(1)
        }

        fn name(&self) -> &str {
            "reverse"
        }
    }

    #[tokio::test]
    async fn test_merger_receives_grid_order_when_fetches_finish_out_of_order() {
        let dir = TempDir::new().unwrap();
        let fetcher = ReverseOrderFetcher {
            tile_count: 4,
            completed: Mutex::new(Vec::new()),
        };
        let svc = ExtractService::with_components(
            Arc::new(fetcher),
            RecordingMerger::default(),
            FsRemover,
            DownloadConfig::new().with_parallel_downloads(4),
            dir.path(),
        );
        let request = ExtractRequest::new(
            BoundingBox::new(1.0, 0.0, 1.0, 0.0),
            TileDimensions::new(0.5, 0.5),
        )
        .with_keep_tiles(true);

        svc.run(&request, CancellationToken::new()).await.unwrap();

        let completed = svc.orchestrator().fetcher().completed.lock().unwrap().clone();
        assert_eq!(
            completed,
            vec!["tile_3.osm", "tile_2.osm", "tile_1.osm", "tile_0.osm"]
        );

        let merged_inputs = svc.merge.merger().inputs.lock().unwrap().clone().unwrap();
        let expected: Vec<PathBuf> = (0..4)
            .map(|i| dir.path().join(format!("tile_{}.osm", i)))
            .collect();
        assert_eq!(merged_inputs, expected);
    }

    #[tokio::test]
    async fn test_output_named_like_tile_is_rejected() {
        let dir = TempDir::new().unwrap();
        let svc = service(dir.path(), FileFetcher::new(vec![]), RecordingMerger::default());
        let request = two_tile_request().with_output("tile_0.osm");

        let result = svc.run(&request, CancellationToken::new()).await;

        assert!(matches!(result, Err(ServiceError::OutputIsTileFile { .. })));
        assert!(matches!(
            svc.plan(&request),
            Err(ServiceError::OutputIsTileFile { .. })
        ));
        assert_eq!(svc.orchestrator().fetcher().calls.load(Ordering::SeqCst), 0);
        assert!(svc.merge.merger().inputs.lock().unwrap().is_none());
    }

    #[test]
    fn test_output_with_tile_prefix_but_other_name_is_allowed() {
        let dir = TempDir::new().unwrap();
        let svc = service(dir.path(), FileFetcher::new(vec![]), RecordingMerger::default());

        for output in ["tile_all.osm", "tile_0.pbf", "tiles/merged.osm"] {
            let request = two_tile_request().with_output(output);
            assert!(svc.plan(&request).is_ok(), "{} should be accepted", output);
        }
    }

    #[tokio::test]
    async fn test_creates_missing_work_dir() {
        let dir = TempDir::new().unwrap();
        let work_dir = dir.path().join("nested").join("out");
        let svc = service(&work_dir, FileFetcher::new(vec![]), RecordingMerger::default());

        let report = svc.run(&two_tile_request(), CancellationToken::new()).await.unwrap();

        assert!(work_dir.is_dir());
        assert_eq!(report.merge.unwrap().output, work_dir.join("merged.osm"));
    }

    #[test]
    fn test_plan_does_not_fetch() {
        let dir = TempDir::new().unwrap();
        let svc = service(dir.path(), FileFetcher::new(vec![]), RecordingMerger::default());

        let tiles = svc.plan(&two_tile_request()).unwrap();

        assert_eq!(tiles.len(), 2);
        assert_eq!(tiles[1].filename(), "tile_1.osm");
        assert_eq!(svc.orchestrator().fetcher().calls.load(Ordering::SeqCst), 0);
        assert!(!dir.path().join("tile_0.osm").exists());
    }

    #[test]
    fn test_production_service_builds() {
        let svc = ExtractService::new(&ServiceConfig::default()).unwrap();
        assert_eq!(svc.work_dir(), Path::new("."));
    }
}
