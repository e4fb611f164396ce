//! Recursive glob-driven asset copy.
//!
//! Patterns are matched against paths *relative to the base directory*.
//! A leading `!` marks an exclusion. The resolver guarantees the final
//! pattern is always the compilable-extension exclusion, so copied assets
//! can never collide with code-build output.
//!
//! Every invocation is a full re-copy of all matched files, never an
//! incremental one — already-present destination files are overwritten.

use std::path::Path;

use globset::{Glob, GlobSet, GlobSetBuilder};
use walkdir::WalkDir;

use tsbolt_core::types::AssetOptions;

use crate::error::{io_err, AssetError};

// ---------------------------------------------------------------------------
// Matcher
// ---------------------------------------------------------------------------

/// Compiled include/exclude sets for one asset pattern list.
///
/// Shared between the copy pass and the watch-mode event filter so both
/// agree on what counts as an asset.
#[derive(Debug)]
pub struct AssetMatcher {
    includes: GlobSet,
    excludes: GlobSet,
}

impl AssetMatcher {
    pub fn new(patterns: &[String]) -> Result<Self, AssetError> {
        let mut includes = GlobSetBuilder::new();
        let mut excludes = GlobSetBuilder::new();

        for pattern in patterns {
            let (builder, raw) = match pattern.strip_prefix('!') {
                Some(negated) => (&mut excludes, negated),
                None => (&mut includes, pattern.as_str()),
            };
            let glob = Glob::new(raw).map_err(|e| AssetError::Pattern {
                pattern: pattern.clone(),
                source: e,
            })?;
            builder.add(glob);
        }

        Ok(Self {
            includes: includes.build().map_err(|e| AssetError::Pattern {
                pattern: patterns.join(","),
                source: e,
            })?,
            excludes: excludes.build().map_err(|e| AssetError::Pattern {
                pattern: patterns.join(","),
                source: e,
            })?,
        })
    }

    /// Does a path (relative to the base directory) name an asset?
    pub fn is_match(&self, relative: &Path) -> bool {
        self.includes.is_match(relative) && !self.excludes.is_match(relative)
    }
}

// ---------------------------------------------------------------------------
// Copy
// ---------------------------------------------------------------------------

/// Counts from one full copy pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyStats {
    pub copied: usize,
}

/// Copy every file under `base_dir` matching the patterns into `out_dir`,
/// preserving relative directory structure.
///
/// A missing base directory copies nothing and succeeds. Files already under
/// the output directory are never treated as sources, even when the output
/// directory sits inside the base directory.
pub fn copy_assets(options: &AssetOptions) -> Result<CopyStats, AssetError> {
    if !options.base_dir.exists() {
        tracing::debug!(base_dir = %options.base_dir.display(), "asset base dir missing; nothing to copy");
        return Ok(CopyStats::default());
    }

    let matcher = AssetMatcher::new(&options.patterns)?;
    let mut stats = CopyStats::default();

    for entry in WalkDir::new(&options.base_dir)
        .into_iter()
        .filter_entry(|e| !e.path().starts_with(&options.out_dir))
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(&options.base_dir) else {
            continue;
        };
        if !matcher.is_match(relative) {
            continue;
        }

        let dest = options.out_dir.join(relative);
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
        }
        std::fs::copy(entry.path(), &dest).map_err(|e| io_err(&dest, e))?;
        tracing::debug!(from = %entry.path().display(), to = %dest.display(), "copied asset");
        stats.copied += 1;
    }

    Ok(stats)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
