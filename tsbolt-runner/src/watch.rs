//! The watch coordinator.
//!
//! Two independent, long-lived subscriptions — assets and code — each with
//! its own notify watcher, its own event channel, and its own minimal
//! reaction. There is no shared lock and no cross-watcher ordering
//! guarantee. The output directory is excluded from both subscriptions;
//! that exclusion is the only safeguard against a watcher observing its own
//! writes and is treated as a strict invariant.
//!
//! Failures inside a loop are logged and the loop keeps watching (unlike
//! one-shot mode, where any failure aborts the run). Loops terminate only
//! when their event channel closes.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use notify::{recommended_watcher, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use tsbolt_assets::{copy_assets, AssetMatcher};
use tsbolt_core::types::{AssetOptions, BuildPlan};
use tsbolt_engine::IncrementalBuild;

use crate::error::{io_err, RunnerError};

// ---------------------------------------------------------------------------
// Coordinator
// ---------------------------------------------------------------------------

/// Run both watch subscriptions until process termination.
///
/// Takes ownership of the incremental build handle; the code loop is its
/// sole owner for the rest of the process lifetime.
pub async fn coordinate<B: IncrementalBuild>(
    plan: &BuildPlan,
    build: B,
) -> Result<(), RunnerError> {
    let base_dir = ensure_canonical_dir(&plan.assets.base_dir)?;
    let out_dir = canonical_or(&plan.out_dir);

    let (mut asset_watcher, asset_rx) = watcher_channel()?;
    asset_watcher.watch(&base_dir, RecursiveMode::Recursive)?;

    let (mut code_watcher, code_rx) = watcher_channel()?;
    let mut entries = HashSet::new();
    for entry in &plan.code.entry_points {
        let canonical = canonical_or(entry);
        if canonical.is_file() {
            code_watcher.watch(&canonical, RecursiveMode::NonRecursive)?;
            entries.insert(canonical);
        } else {
            tracing::warn!(path = %canonical.display(), "entry point missing; not watched");
        }
    }

    let asset_options = AssetOptions {
        base_dir,
        out_dir: out_dir.clone(),
        patterns: plan.assets.patterns.clone(),
    };

    tracing::info!(
        base_dir = %asset_options.base_dir.display(),
        entry_points = entries.len(),
        "watching for changes",
    );

    // The watchers must stay alive for as long as the loops run.
    let (asset_result, code_result) = tokio::join!(
        asset_watch_loop(asset_rx, &asset_options),
        code_watch_loop(code_rx, build, &entries, &out_dir),
    );
    asset_result?;
    code_result
}

// ---------------------------------------------------------------------------
// Event filters (pure)
// ---------------------------------------------------------------------------

/// Does a changed path warrant a full asset re-copy?
pub(crate) fn asset_event_matches(
    path: &Path,
    matcher: &AssetMatcher,
    base_dir: &Path,
    out_dir: &Path,
) -> bool {
    if path.starts_with(out_dir) {
        return false;
    }
    let Ok(relative) = path.strip_prefix(base_dir) else {
        return false;
    };
    matcher.is_match(relative)
}

/// Does a changed path warrant an incremental rebuild?
pub(crate) fn code_event_matches(
    path: &Path,
    entries: &HashSet<PathBuf>,
    out_dir: &Path,
) -> bool {
    !path.starts_with(out_dir) && entries.contains(path)
}

fn is_relevant_event_kind(kind: &EventKind) -> bool {
    matches!(kind, EventKind::Create(_) | EventKind::Modify(_))
}

// ---------------------------------------------------------------------------
// Watch loops
// ---------------------------------------------------------------------------

/// React to asset changes with a full re-copy of all patterns.
///
/// Deliberately not incremental: any matched change re-copies everything.
pub(crate) async fn asset_watch_loop(
    mut rx: mpsc::UnboundedReceiver<PathBuf>,
    options: &AssetOptions,
) -> Result<(), RunnerError> {
    let matcher = AssetMatcher::new(&options.patterns)?;

    while let Some(path) = rx.recv().await {
        if !asset_event_matches(&path, &matcher, &options.base_dir, &options.out_dir) {
            continue;
        }

        let started = Instant::now();
        let copy_options = options.clone();
        let outcome = tokio::task::spawn_blocking(move || copy_assets(&copy_options)).await;
        match outcome {
            Ok(Ok(stats)) => tracing::info!(
                trigger = %path.display(),
                copied = stats.copied,
                duration_ms = started.elapsed().as_millis() as u64,
                "assets re-copied",
            ),
            // Watch-mode copy failures are reported but never stop the loop.
            Ok(Err(err)) => tracing::error!(error = %err, "asset re-copy failed"),
            Err(err) => tracing::error!(error = %err, "asset copy task join failure"),
        }
    }

    Ok(())
}

/// React to entry-point changes with one `rebuild()` on the owned handle.
pub(crate) async fn code_watch_loop<B: IncrementalBuild>(
    mut rx: mpsc::UnboundedReceiver<PathBuf>,
    mut build: B,
    entries: &HashSet<PathBuf>,
    out_dir: &Path,
) -> Result<(), RunnerError> {
    while let Some(path) = rx.recv().await {
        if !code_event_matches(&path, entries, out_dir) {
            continue;
        }

        let started = Instant::now();
        match build.rebuild().await {
            Ok(()) => tracing::info!(
                trigger = %path.display(),
                duration_ms = started.elapsed().as_millis() as u64,
                "rebuild completed",
            ),
            // Watch-mode build failures are reported but never stop the loop.
            Err(err) => tracing::error!(error = %err, "rebuild failed"),
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Plumbing
// ---------------------------------------------------------------------------

/// A notify watcher whose matched-kind event paths land on an async channel.
fn watcher_channel(
) -> Result<(RecommendedWatcher, mpsc::UnboundedReceiver<PathBuf>), RunnerError> {
    let (tx, rx) = mpsc::unbounded_channel::<PathBuf>();
    let watcher = recommended_watcher(move |event: notify::Result<Event>| match event {
        Ok(event) if is_relevant_event_kind(&event.kind) => {
            for path in event.paths {
                let _ = tx.send(path);
            }
        }
        Ok(_) => {}
        Err(err) => tracing::warn!(error = %err, "watcher event error"),
    })?;
    Ok((watcher, rx))
}

/// Canonicalize so watcher-reported real paths (e.g. `/private/var/...` on
/// macOS) survive the `starts_with`/`strip_prefix` checks above.
fn canonical_or(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

fn ensure_canonical_dir(dir: &Path) -> Result<PathBuf, RunnerError> {
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
    }
    Ok(canonical_or(dir))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    use tempfile::TempDir;
    use tsbolt_core::resolver::COMPILABLE_EXCLUSION;
    use tsbolt_engine::EngineError;

    fn default_patterns() -> Vec<String> {
        vec!["**/*".to_owned(), COMPILABLE_EXCLUSION.to_owned()]
    }

    /// Rebuild handle that counts invocations and optionally fails first.
    struct CountingBuild {
        rebuilds: Rc<Cell<usize>>,
        fail_first: bool,
    }

    impl IncrementalBuild for CountingBuild {
        async fn rebuild(&mut self) -> Result<(), EngineError> {
            let n = self.rebuilds.get() + 1;
            self.rebuilds.set(n);
            if self.fail_first && n == 1 {
                return Err(EngineError::BuildFailed {
                    stderr: "transient".to_owned(),
                });
            }
            Ok(())
        }
    }

    // ─── Pure filters ──────────────────────────────────────────────────────

    #[test]
    fn asset_filter_requires_base_dir_and_pattern_match() {
        let matcher = AssetMatcher::new(&default_patterns()).expect("matcher");
        let base = Path::new("/project/src");
        let out = Path::new("/project/dist");

        assert!(asset_event_matches(
            Path::new("/project/src/views/a.html"),
            &matcher,
            base,
            out
        ));
        assert!(!asset_event_matches(
            Path::new("/project/src/a.ts"),
            &matcher,
            base,
            out
        ));
        assert!(!asset_event_matches(
            Path::new("/project/other/a.html"),
            &matcher,
            base,
            out
        ));
    }

    #[test]
    fn output_dir_is_excluded_from_both_filters() {
        let matcher = AssetMatcher::new(&default_patterns()).expect("matcher");
        // Output directory nested inside the asset base dir: still excluded.
        let base = Path::new("/project/src");
        let out = Path::new("/project/src/dist");
        assert!(!asset_event_matches(
            Path::new("/project/src/dist/a.html"),
            &matcher,
            base,
            out
        ));

        let entries: HashSet<PathBuf> = [PathBuf::from("/project/src/dist/a.ts")].into();
        assert!(!code_event_matches(
            Path::new("/project/src/dist/a.ts"),
            &entries,
            out
        ));
    }

    #[test]
    fn code_filter_matches_only_known_entry_points() {
        let entries: HashSet<PathBuf> =
            [PathBuf::from("/p/src/a.ts"), PathBuf::from("/p/src/b.ts")].into();
        let out = Path::new("/p/dist");

        assert!(code_event_matches(Path::new("/p/src/a.ts"), &entries, out));
        assert!(!code_event_matches(Path::new("/p/src/c.ts"), &entries, out));
        assert!(!code_event_matches(Path::new("/p/src/a.css"), &entries, out));
    }

    #[test]
    fn remove_events_are_not_relevant() {
        assert!(is_relevant_event_kind(&EventKind::Create(
            notify::event::CreateKind::File
        )));
        assert!(is_relevant_event_kind(&EventKind::Modify(
            notify::event::ModifyKind::Any
        )));
        assert!(!is_relevant_event_kind(&EventKind::Remove(
            notify::event::RemoveKind::File
        )));
    }

    // ─── Loop behavior with injected synthetic events ──────────────────────

    #[tokio::test]
    async fn asset_event_triggers_exactly_one_full_recopy() {
        let root = TempDir::new().expect("root");
        let base = root.path().join("src");
        let out = root.path().join("dist");
        std::fs::create_dir_all(&base).expect("mkdir");
        std::fs::write(base.join("page.html"), "<html>").expect("write");
        std::fs::write(base.join("data.json"), "{}").expect("write");

        let options = AssetOptions {
            base_dir: base.clone(),
            out_dir: out.clone(),
            patterns: default_patterns(),
        };

        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(base.join("page.html")).expect("inject event");
        drop(tx); // channel closes after the one event; the loop drains and exits

        asset_watch_loop(rx, &options).await.expect("loop");

        // A single event re-copies *all* matched assets, not just the trigger.
        assert!(out.join("page.html").exists());
        assert!(out.join("data.json").exists());
    }

    #[tokio::test]
    async fn non_matching_asset_event_copies_nothing() {
        let root = TempDir::new().expect("root");
        let base = root.path().join("src");
        let out = root.path().join("dist");
        std::fs::create_dir_all(&base).expect("mkdir");
        std::fs::write(base.join("code.ts"), "export {}").expect("write");

        let options = AssetOptions {
            base_dir: base.clone(),
            out_dir: out.clone(),
            patterns: default_patterns(),
        };

        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(base.join("code.ts")).expect("inject event");
        drop(tx);

        asset_watch_loop(rx, &options).await.expect("loop");
        assert!(!out.exists(), "a source-file event must not trigger a copy");
    }

    #[tokio::test]
    async fn code_event_triggers_exactly_one_rebuild() {
        let entry = PathBuf::from("/p/src/a.ts");
        let entries: HashSet<PathBuf> = [entry.clone()].into();
        let rebuilds = Rc::new(Cell::new(0));

        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(entry).expect("inject event");
        tx.send(PathBuf::from("/p/src/unrelated.html"))
            .expect("inject non-entry event");
        drop(tx);

        code_watch_loop(
            rx,
            CountingBuild {
                rebuilds: rebuilds.clone(),
                fail_first: false,
            },
            &entries,
            Path::new("/p/dist"),
        )
        .await
        .expect("loop");

        assert_eq!(rebuilds.get(), 1, "one entry event, one rebuild");
    }

    #[tokio::test]
    async fn rebuild_failure_keeps_the_loop_watching() {
        let entry = PathBuf::from("/p/src/a.ts");
        let entries: HashSet<PathBuf> = [entry.clone()].into();
        let rebuilds = Rc::new(Cell::new(0));

        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(entry.clone()).expect("first event");
        tx.send(entry).expect("second event");
        drop(tx);

        code_watch_loop(
            rx,
            CountingBuild {
                rebuilds: rebuilds.clone(),
                fail_first: true,
            },
            &entries,
            Path::new("/p/dist"),
        )
        .await
        .expect("loop survives a failed rebuild");

        assert_eq!(rebuilds.get(), 2, "loop must keep processing after a failure");
    }

    #[tokio::test]
    async fn copy_failure_keeps_the_asset_loop_watching() {
        let root = TempDir::new().expect("root");
        let base = root.path().join("src");
        let out = root.path().join("dist");
        std::fs::create_dir_all(&base).expect("mkdir");
        std::fs::write(base.join("a.html"), "x").expect("write");
        // A plain file squatting on the output path makes every copy fail.
        std::fs::write(&out, "not a directory").expect("write");

        let options = AssetOptions {
            base_dir: base.clone(),
            out_dir: out.clone(),
            patterns: default_patterns(),
        };

        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(base.join("a.html")).expect("first event");
        tx.send(base.join("a.html")).expect("second event");
        drop(tx);

        asset_watch_loop(rx, &options)
            .await
            .expect("loop survives failed copies");
        assert!(out.is_file(), "output path untouched after failed copies");
    }
}
