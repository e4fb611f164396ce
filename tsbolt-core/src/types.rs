//! Configuration inputs and the resolved build plan.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.
//! The two input types ([`CompilerConfig`], [`UserConfig`]) are read-only once
//! loaded; the [`BuildPlan`] is immutable once resolved — a configuration
//! change requires a process restart.

use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;
use serde_json::Value;

// ---------------------------------------------------------------------------
// Compiler configuration (tsconfig.json side)
// ---------------------------------------------------------------------------

/// The subset of `compilerOptions` the resolver consults.
///
/// `target` is deliberately absent: the resolver reads it from the raw
/// document ([`CompilerConfig::raw`]) so the value is forwarded exactly as
/// written.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerOptions {
    pub out_dir: Option<PathBuf>,
    pub source_map: Option<bool>,
    pub inline_source_map: Option<bool>,
    pub inline_sources: Option<bool>,
}

/// A located and parsed compiler configuration.
///
/// Produced by [`crate::tsconfig::load`]; consumed read-only by the resolver.
#[derive(Debug, Clone)]
pub struct CompilerConfig {
    pub options: CompilerOptions,
    /// Source files resolved from `files` + `include`/`exclude`.
    pub file_names: Vec<PathBuf>,
    /// The untouched parsed document. Consulted only to recover
    /// `compilerOptions.target` as written.
    pub raw: Value,
    /// The config file actually located on disk.
    pub config_path: PathBuf,
}

// ---------------------------------------------------------------------------
// User configuration (tsbolt.config.json side)
// ---------------------------------------------------------------------------

/// Code-build overrides, shaped after the esbuild option surface.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EsbuildConfig {
    /// Extra entry points built in addition to the compiler's file list.
    pub entry_points: Option<Vec<PathBuf>>,
    pub target: Option<String>,
    pub minify: Option<bool>,
    /// Named engine plugins, passed through to the build engine.
    pub plugins: Option<Vec<String>>,
}

/// Asset-copy overrides.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetsConfig {
    pub base_dir: Option<PathBuf>,
    pub file_patterns: Option<Vec<String>>,
}

/// User configuration. Every field is optional; absence falls back through
/// the layered precedence rules in [`crate::resolver`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserConfig {
    pub out_dir: Option<PathBuf>,
    /// Name of the compiler config file to locate (default `tsconfig.json`).
    pub ts_config_file: Option<String>,
    pub watch: Option<bool>,
    #[serde(default)]
    pub esbuild: EsbuildConfig,
    #[serde(default)]
    pub assets: AssetsConfig,
}

// ---------------------------------------------------------------------------
// Source-map mode
// ---------------------------------------------------------------------------

/// How the code-build engine should emit source maps.
///
/// Mirrors the esbuild `sourcemap` option triple: off, separate file, inline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceMapMode {
    Disabled,
    External,
    Inline,
}

impl fmt::Display for SourceMapMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceMapMode::Disabled => write!(f, "disabled"),
            SourceMapMode::External => write!(f, "external"),
            SourceMapMode::Inline => write!(f, "inline"),
        }
    }
}

// ---------------------------------------------------------------------------
// Build plan
// ---------------------------------------------------------------------------

/// Options driving one code-build invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeBuildOptions {
    pub out_dir: PathBuf,
    /// Compiler-resolved files first, user-added entry points appended.
    pub entry_points: Vec<PathBuf>,
    pub source_map: SourceMapMode,
    pub target: String,
    pub minify: bool,
    pub plugins: Vec<String>,
    /// Passed through so the engine can honor compiler-specific resolution
    /// (e.g. path aliases) independently.
    pub tsconfig: PathBuf,
}

/// Options driving one full asset-copy pass.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetOptions {
    pub base_dir: PathBuf,
    pub out_dir: PathBuf,
    /// Include patterns, with exclusions prefixed by `!`. The final element
    /// is always the compilable-extension exclusion; see
    /// [`crate::resolver::COMPILABLE_EXCLUSION`].
    pub patterns: Vec<String>,
}

/// The fully resolved, immutable set of options governing one build
/// invocation, derived from layered configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildPlan {
    pub out_dir: PathBuf,
    pub code: CodeBuildOptions,
    pub assets: AssetOptions,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
