//! Build orchestration.
//!
//! Exactly one of two mutually exclusive modes is selected at process start
//! and never switched at runtime:
//!
//! - **one-shot**: clear output, then run the code build and the asset copy
//!   concurrently; both must succeed (join semantics, no rollback).
//! - **watch**: clear output, one initial code build (keeping the incremental
//!   handle), one initial asset copy — strictly sequential so each phase is
//!   independently timed — then hand off to the watch coordinator for the
//!   rest of the process lifetime.

use std::time::Instant;

use tsbolt_assets::{clear_output, copy_assets, CopyStats};
use tsbolt_core::types::{AssetOptions, BuildPlan};
use tsbolt_engine::BuildEngine;

use crate::error::{io_err, RunnerError};
use crate::watch;

/// Mode flag, selected once from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMode {
    Once,
    Watch,
}

/// Set up the runtime and drive the selected mode until completion.
///
/// The event loop is single-threaded and cooperative; blocking filesystem
/// work (the asset copy) is bridged through `spawn_blocking`.
pub fn start_blocking<E: BuildEngine>(
    engine: &E,
    plan: &BuildPlan,
    mode: BuildMode,
) -> Result<(), RunnerError> {
    init_tracing();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;
    runtime.block_on(async {
        match mode {
            BuildMode::Once => run_once(engine, plan).await,
            BuildMode::Watch => run_watch(engine, plan).await,
        }
    })
}

// ---------------------------------------------------------------------------
// One-shot mode
// ---------------------------------------------------------------------------

/// Clear the output tree, then build code and copy assets concurrently.
///
/// Fails if either operation fails, surfacing the underlying error; the
/// output directory is left in whatever partial state the two operations
/// produced.
pub async fn run_once<E: BuildEngine>(engine: &E, plan: &BuildPlan) -> Result<(), RunnerError> {
    clear_output(&plan.out_dir)?;

    let started = Instant::now();
    let (build_result, copy_result) =
        tokio::join!(engine.build(&plan.code), copy_assets_task(&plan.assets));

    let _build = build_result?;
    let stats = copy_result?;

    tracing::info!(
        entry_points = plan.code.entry_points.len(),
        assets_copied = stats.copied,
        duration_ms = started.elapsed().as_millis() as u64,
        "build completed",
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Watch mode
// ---------------------------------------------------------------------------

/// Clear output, run the initial passes, then watch until process exit.
pub async fn run_watch<E: BuildEngine>(engine: &E, plan: &BuildPlan) -> Result<(), RunnerError> {
    let build = initial_watch_passes(engine, plan).await?;
    watch::coordinate(plan, build).await
}

/// The two sequential start-up passes of watch mode.
///
/// Returns the incremental build handle the code watcher will own.
pub(crate) async fn initial_watch_passes<E: BuildEngine>(
    engine: &E,
    plan: &BuildPlan,
) -> Result<E::Build, RunnerError> {
    clear_output(&plan.out_dir)?;

    let started = Instant::now();
    let build = engine.build(&plan.code).await?;
    tracing::info!(
        entry_points = plan.code.entry_points.len(),
        duration_ms = started.elapsed().as_millis() as u64,
        "initial build completed",
    );

    let started = Instant::now();
    let stats = copy_assets_task(&plan.assets).await?;
    tracing::info!(
        assets_copied = stats.copied,
        duration_ms = started.elapsed().as_millis() as u64,
        "initial asset copy completed",
    );

    Ok(build)
}

async fn copy_assets_task(options: &AssetOptions) -> Result<CopyStats, RunnerError> {
    let options = options.clone();
    tokio::task::spawn_blocking(move || copy_assets(&options))
        .await
        .map_err(|e| RunnerError::Join(format!("asset copy task: {e}")))?
        .map_err(RunnerError::from)
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
