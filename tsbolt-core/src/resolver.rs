//! Layered configuration resolution.
//!
//! Precedence is always: user config > compiler config > hardcoded default.
//! Each field is resolved by an explicit precedence-ordered candidate list
//! evaluated left-to-right (first defined value wins), never ad-hoc fallback
//! chains scattered through call sites.

use std::path::PathBuf;

use crate::types::{
    AssetOptions, BuildPlan, CodeBuildOptions, CompilerConfig, CompilerOptions, SourceMapMode,
    UserConfig,
};

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

pub const DEFAULT_OUT_DIR: &str = "dist";
pub const DEFAULT_TARGET: &str = "es6";
pub const DEFAULT_ASSET_BASE_DIR: &str = "src";
pub const DEFAULT_ASSET_PATTERN: &str = "**/*";

/// Exclusion appended to every asset pattern list so the copy path never
/// re-emits raw source files into the output tree. Non-negotiable: the
/// asset-copy and code-build outputs must never overlap.
pub const COMPILABLE_EXCLUSION: &str = "!**/*.{ts,js,tsx,jsx}";

// ---------------------------------------------------------------------------
// Per-field precedence
// ---------------------------------------------------------------------------

/// First defined value in the layered candidate list, else the default.
fn pick<T>(layers: impl IntoIterator<Item = Option<T>>, default: T) -> T {
    layers.into_iter().flatten().next().unwrap_or(default)
}

/// `compilerOptions.target` as written in the raw document, if any.
fn raw_target(compiler: &CompilerConfig) -> Option<String> {
    compiler
        .raw
        .get("compilerOptions")
        .and_then(|o| o.get("target"))
        .and_then(|t| t.as_str())
        .map(str::to_owned)
}

// ---------------------------------------------------------------------------
// Source-map mode
// ---------------------------------------------------------------------------

/// Resolve the engine source-map mode from the compiler's three
/// mutually-constraining flags. Branch order matters:
///
/// 1. `inlineSources` without any map target is meaningless — fail safe.
/// 2. `sourceMap` + `inlineSourceMap` together are contradictory upstream —
///    fail safe rather than propagating the invalid pair.
/// 3. `inlineSourceMap` alone → inline.
/// 4. Otherwise pass through the raw `sourceMap` boolean.
pub fn resolve_source_map_mode(options: &CompilerOptions) -> SourceMapMode {
    let source_map = options.source_map.unwrap_or(false);
    let inline_source_map = options.inline_source_map.unwrap_or(false);
    let inline_sources = options.inline_sources.unwrap_or(false);

    if inline_sources && !inline_source_map && !source_map {
        return SourceMapMode::Disabled;
    }
    if source_map && inline_source_map {
        return SourceMapMode::Disabled;
    }
    if inline_source_map {
        return SourceMapMode::Inline;
    }
    if source_map {
        SourceMapMode::External
    } else {
        SourceMapMode::Disabled
    }
}

// ---------------------------------------------------------------------------
// Plan resolution
// ---------------------------------------------------------------------------

/// Resolve a [`BuildPlan`] from the two read-only configuration inputs.
///
/// Pure; the plan is computed once per process invocation and never mutated.
pub fn resolve_plan(compiler: &CompilerConfig, user: &UserConfig) -> BuildPlan {
    let out_dir = pick(
        [user.out_dir.clone(), compiler.options.out_dir.clone()],
        PathBuf::from(DEFAULT_OUT_DIR),
    );

    let mut entry_points = compiler.file_names.clone();
    if let Some(extra) = &user.esbuild.entry_points {
        entry_points.extend(extra.iter().cloned());
    }

    let code = CodeBuildOptions {
        out_dir: out_dir.clone(),
        entry_points,
        source_map: resolve_source_map_mode(&compiler.options),
        target: pick(
            [user.esbuild.target.clone(), raw_target(compiler)],
            DEFAULT_TARGET.to_owned(),
        ),
        minify: user.esbuild.minify.unwrap_or(false),
        plugins: user.esbuild.plugins.clone().unwrap_or_default(),
        tsconfig: compiler.config_path.clone(),
    };

    let mut patterns = user
        .assets
        .file_patterns
        .clone()
        .unwrap_or_else(|| vec![DEFAULT_ASSET_PATTERN.to_owned()]);
    patterns.push(COMPILABLE_EXCLUSION.to_owned());

    let assets = AssetOptions {
        base_dir: pick(
            [user.assets.base_dir.clone()],
            PathBuf::from(DEFAULT_ASSET_BASE_DIR),
        ),
        out_dir: out_dir.clone(),
        patterns,
    };

    BuildPlan {
        out_dir,
        code,
        assets,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn compiler_with(options: CompilerOptions) -> CompilerConfig {
        CompilerConfig {
            options,
            file_names: vec![PathBuf::from("a.ts"), PathBuf::from("b.ts")],
            raw: json!({}),
            config_path: PathBuf::from("tsconfig.json"),
        }
    }

    #[test]
    fn out_dir_prefers_user_over_compiler() {
        let compiler = compiler_with(CompilerOptions {
            out_dir: Some(PathBuf::from("build")),
            ..Default::default()
        });
        let user = UserConfig {
            out_dir: Some(PathBuf::from("lib")),
            ..Default::default()
        };
        let plan = resolve_plan(&compiler, &user);
        assert_eq!(plan.out_dir, PathBuf::from("lib"));
        assert_eq!(plan.code.out_dir, PathBuf::from("lib"));
        assert_eq!(plan.assets.out_dir, PathBuf::from("lib"));
    }

    #[test]
    fn out_dir_falls_back_to_compiler() {
        let compiler = compiler_with(CompilerOptions {
            out_dir: Some(PathBuf::from("build")),
            ..Default::default()
        });
        let plan = resolve_plan(&compiler, &UserConfig::default());
        assert_eq!(plan.out_dir, PathBuf::from("build"));
    }

    #[test]
    fn out_dir_defaults_to_dist() {
        let compiler = compiler_with(CompilerOptions::default());
        let plan = resolve_plan(&compiler, &UserConfig::default());
        assert_eq!(plan.out_dir, PathBuf::from(DEFAULT_OUT_DIR));
    }

    #[test]
    fn entry_points_concatenate_compiler_files_first() {
        let compiler = compiler_with(CompilerOptions::default());
        let user = UserConfig {
            esbuild: crate::types::EsbuildConfig {
                entry_points: Some(vec![PathBuf::from("extra.ts")]),
                ..Default::default()
            },
            ..Default::default()
        };
        let plan = resolve_plan(&compiler, &user);
        assert_eq!(
            plan.code.entry_points,
            vec![
                PathBuf::from("a.ts"),
                PathBuf::from("b.ts"),
                PathBuf::from("extra.ts"),
            ]
        );
    }

    #[test]
    fn target_precedence_user_then_raw_then_default() {
        let mut compiler = compiler_with(CompilerOptions::default());
        compiler.raw = json!({ "compilerOptions": { "target": "es2020" } });

        let user = UserConfig {
            esbuild: crate::types::EsbuildConfig {
                target: Some("es2022".to_owned()),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(resolve_plan(&compiler, &user).code.target, "es2022");
        assert_eq!(
            resolve_plan(&compiler, &UserConfig::default()).code.target,
            "es2020"
        );

        compiler.raw = json!({});
        assert_eq!(
            resolve_plan(&compiler, &UserConfig::default()).code.target,
            DEFAULT_TARGET
        );
    }

    #[test]
    fn minify_and_plugins_default_off_and_empty() {
        let compiler = compiler_with(CompilerOptions::default());
        let plan = resolve_plan(&compiler, &UserConfig::default());
        assert!(!plan.code.minify);
        assert!(plan.code.plugins.is_empty());
    }

    #[test]
    fn tsconfig_path_is_passed_through() {
        let mut compiler = compiler_with(CompilerOptions::default());
        compiler.config_path = PathBuf::from("/project/tsconfig.json");
        let plan = resolve_plan(&compiler, &UserConfig::default());
        assert_eq!(plan.code.tsconfig, PathBuf::from("/project/tsconfig.json"));
    }

    #[test]
    fn asset_patterns_always_end_with_compilable_exclusion() {
        let compiler = compiler_with(CompilerOptions::default());

        for patterns in [
            None,
            Some(vec![]),
            Some(vec!["**/*.json".to_owned(), "images/**".to_owned()]),
        ] {
            let user = UserConfig {
                assets: crate::types::AssetsConfig {
                    file_patterns: patterns,
                    ..Default::default()
                },
                ..Default::default()
            };
            let plan = resolve_plan(&compiler, &user);
            assert_eq!(
                plan.assets.patterns.last().map(String::as_str),
                Some(COMPILABLE_EXCLUSION),
            );
        }
    }

    #[test]
    fn asset_overrides_are_used_verbatim() {
        let compiler = compiler_with(CompilerOptions::default());
        let user = UserConfig {
            assets: crate::types::AssetsConfig {
                base_dir: Some(PathBuf::from("public")),
                file_patterns: Some(vec!["**/*.svg".to_owned()]),
            },
            ..Default::default()
        };
        let plan = resolve_plan(&compiler, &user);
        assert_eq!(plan.assets.base_dir, PathBuf::from("public"));
        assert_eq!(plan.assets.patterns[0], "**/*.svg");
        assert_eq!(plan.assets.patterns.len(), 2);
    }

    #[test]
    fn asset_base_dir_defaults_to_src() {
        let compiler = compiler_with(CompilerOptions::default());
        let plan = resolve_plan(&compiler, &UserConfig::default());
        assert_eq!(plan.assets.base_dir, PathBuf::from("src"));
        assert_eq!(plan.assets.patterns[0], DEFAULT_ASSET_PATTERN);
    }
}
