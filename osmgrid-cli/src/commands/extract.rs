//! Extract command - download an area tile by tile and merge it.

use osmgrid::orchestrator::{FetchOutcome, FetchStatus};
use osmgrid::service::{ExtractReport, ExtractRequest, ServiceConfig};
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::common::{resolve_request, resolve_service_config, ExtractArgs};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Run the extract command.
pub async fn run(
    args: ExtractArgs,
    config_path: Option<&Path>,
    debug: bool,
) -> Result<(), CliError> {
    let runner = CliRunner::new(config_path, debug)?;
    runner.log_startup("extract");
    let config = runner.config();

    let request = resolve_request(&args, config)?;
    let service_config = resolve_service_config(&args, config)?;
    let service = runner
        .create_service(&service_config)?
        .with_progress(Arc::new(print_progress));

    print_settings(&request, &service_config, &service.output_path(&request));

    if args.dry_run {
        let tiles = service.plan(&request)?;
        println!("Tile plan ({} tiles):", tiles.len());
        for tile in &tiles {
            println!("  {:<14} {}", tile.filename(), tile.bbox());
        }
        return Ok(());
    }

    let token = CancellationToken::new();
    spawn_interrupt_handler(token.clone());

    println!("Tiles:");
    let report = service.run(&request, token).await?;
    print_report(&report);

    Ok(())
}

/// Cancels `token` on Ctrl-C.
fn spawn_interrupt_handler(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling extraction");
            eprintln!();
            eprintln!("Interrupted - waiting for in-flight tiles to finish...");
            token.cancel();
        }
    });
}

fn print_settings(request: &ExtractRequest, config: &ServiceConfig, output: &Path) {
    println!("osmgrid v{}", osmgrid::VERSION);
    println!();
    println!("Area:        {}", request.bbox);
    println!("Tile size:   {}", request.dims);
    println!("Endpoint:    {}", config.endpoint());
    println!(
        "Parallel:    {} (timeout {}s)",
        config.download().parallel_downloads(),
        config.download().timeout_secs()
    );
    println!("Merge:       {} -> {}", config.merge_command(), output.display());
    println!(
        "Tiles:       {}",
        if request.keep_tiles { "kept" } else { "removed after merge" }
    );
    println!();
}

/// Prints one line per tile as its fetch finishes.
fn print_progress(outcome: &FetchOutcome) {
    match &outcome.status {
        FetchStatus::Downloaded { bytes } => {
            println!("  {:<14} ok      {} bytes", outcome.filename, bytes)
        }
        FetchStatus::Failed { error } => {
            println!("  {:<14} FAILED  {}", outcome.filename, error)
        }
        FetchStatus::Cancelled => println!("  {:<14} cancelled", outcome.filename),
    }
}

fn print_report(report: &ExtractReport) {
    // Finished tiles were already printed by print_progress
    for outcome in report.run.outcomes.iter().filter(|o| o.is_cancelled()) {
        print_progress(outcome);
    }
    println!();

    match &report.merge {
        Some(merge) if merge.success => println!("Merged into {}", merge.output.display()),
        Some(merge) => println!(
            "Merge into {} FAILED: {}",
            merge.output.display(),
            merge.error.as_deref().unwrap_or("unknown error")
        ),
        None => println!("Merge skipped (cancelled); tile files left in place"),
    }

    if !report.cleanup.is_empty() {
        println!();
        println!("Cleanup:");
        for outcome in &report.cleanup {
            match &outcome.error {
                None => println!("  removed {}", outcome.path.display()),
                Some(e) => println!("  FAILED to remove {}: {}", outcome.path.display(), e),
            }
        }
    }

    println!();
    println!("{}", report.run.stats);
    info!(
        merged = report.merged(),
        stats = %report.run.stats,
        "Extraction finished"
    );
}
