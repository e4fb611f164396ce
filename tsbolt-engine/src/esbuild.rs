//! esbuild CLI engine.
//!
//! Each entry point is emitted independently (no bundling), as CommonJS for
//! the node platform. The flag surface is derived from [`CodeBuildOptions`];
//! the tsconfig path is forwarded so esbuild honors compiler-specific
//! resolution such as path aliases.
//!
//! `rebuild()` re-runs the same invocation — the CLI holds no persistent
//! incremental state across processes. Engines with real incremental caches
//! plug in behind the same [`BuildEngine`] trait.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Output;

use tokio::process::Command;

use tsbolt_core::types::{CodeBuildOptions, SourceMapMode};

use crate::engine::{BuildEngine, IncrementalBuild};
use crate::error::EngineError;

const DEFAULT_BINARY: &str = "esbuild";

/// Engine backed by the `esbuild` executable.
#[derive(Debug, Clone)]
pub struct EsbuildCli {
    binary: PathBuf,
}

impl Default for EsbuildCli {
    fn default() -> Self {
        Self {
            binary: PathBuf::from(DEFAULT_BINARY),
        }
    }
}

impl EsbuildCli {
    /// Use a specific engine executable instead of `esbuild` from `$PATH`.
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

/// Persistent handle for one esbuild invocation's options.
#[derive(Debug)]
pub struct EsbuildBuild {
    binary: PathBuf,
    args: Vec<OsString>,
}

impl BuildEngine for EsbuildCli {
    type Build = EsbuildBuild;

    async fn build(&self, options: &CodeBuildOptions) -> Result<Self::Build, EngineError> {
        if !options.plugins.is_empty() {
            tracing::warn!(
                plugins = ?options.plugins,
                "plugins are not supported by the esbuild CLI engine; ignoring",
            );
        }

        let args = args_for(options);
        run(&self.binary, &args).await?;
        Ok(EsbuildBuild {
            binary: self.binary.clone(),
            args,
        })
    }
}

impl IncrementalBuild for EsbuildBuild {
    async fn rebuild(&mut self) -> Result<(), EngineError> {
        run(&self.binary, &self.args).await
    }
}

async fn run(binary: &Path, args: &[OsString]) -> Result<(), EngineError> {
    let Output {
        status, stderr, ..
    } = Command::new(binary)
        .args(args)
        .output()
        .await
        .map_err(|e| EngineError::Spawn {
            binary: binary.to_path_buf(),
            source: e,
        })?;

    let stderr = String::from_utf8_lossy(&stderr).into_owned();
    if !status.success() {
        return Err(EngineError::BuildFailed { stderr });
    }
    if !stderr.trim().is_empty() {
        // esbuild prints warnings to stderr even on success.
        tracing::warn!("{}", stderr.trim_end());
    }
    Ok(())
}

fn args_for(options: &CodeBuildOptions) -> Vec<OsString> {
    let mut args: Vec<OsString> = options
        .entry_points
        .iter()
        .map(|p| p.as_os_str().to_owned())
        .collect();

    let mut outdir = OsString::from("--outdir=");
    outdir.push(options.out_dir.as_os_str());
    args.push(outdir);

    args.push("--format=cjs".into());
    args.push("--platform=node".into());
    args.push(format!("--target={}", options.target).into());

    match options.source_map {
        SourceMapMode::Disabled => {}
        SourceMapMode::External => args.push("--sourcemap".into()),
        SourceMapMode::Inline => args.push("--sourcemap=inline".into()),
    }
    if options.minify {
        args.push("--minify".into());
    }

    let mut tsconfig = OsString::from("--tsconfig=");
    tsconfig.push(options.tsconfig.as_os_str());
    args.push(tsconfig);

    args
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
