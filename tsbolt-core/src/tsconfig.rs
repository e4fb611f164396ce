//! Compiler-configuration locator and parser.
//!
//! # Lookup
//!
//! `tsconfig.json` is searched for in the start directory and every ancestor,
//! mirroring the compiler's own lookup. The file is JSONC: `//` and `/* */`
//! comments plus trailing commas are tolerated.
//!
//! # File-list expansion
//!
//! `files` entries are taken verbatim (relative to the config directory).
//! `include` globs (default `**/*.ts` + `**/*.tsx`) are expanded over the
//! config directory; `exclude` globs, `node_modules`, and the configured
//! `outDir` are always skipped. Results are sorted for determinism.

use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use walkdir::WalkDir;

use crate::error::{io_err, ConfigError};
use crate::types::{CompilerConfig, CompilerOptions};

pub const DEFAULT_TSCONFIG_FILE: &str = "tsconfig.json";

const DEFAULT_INCLUDE: [&str; 2] = ["**/*.ts", "**/*.tsx"];

// ---------------------------------------------------------------------------
// Locate
// ---------------------------------------------------------------------------

/// Search `start_dir` and its ancestors for `file_name`.
pub fn locate(start_dir: &Path, file_name: &str) -> Result<PathBuf, ConfigError> {
    for dir in start_dir.ancestors() {
        let candidate = dir.join(file_name);
        if candidate.is_file() {
            return Ok(candidate);
        }
    }
    Err(ConfigError::ConfigNotFound {
        file_name: file_name.to_owned(),
        start_dir: start_dir.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

/// Locate and parse the compiler configuration, expanding the file list.
pub fn load(start_dir: &Path, file_name: &str) -> Result<CompilerConfig, ConfigError> {
    let config_path = locate(start_dir, file_name)?;
    let text = std::fs::read_to_string(&config_path).map_err(|e| io_err(&config_path, e))?;

    let raw: serde_json::Value =
        serde_json::from_str(&strip_jsonc(&text)).map_err(|e| ConfigError::Parse {
            path: config_path.clone(),
            source: e,
        })?;

    let mut options: CompilerOptions = match raw.get("compilerOptions") {
        Some(value) => {
            serde_json::from_value(value.clone()).map_err(|e| ConfigError::Parse {
                path: config_path.clone(),
                source: e,
            })?
        }
        None => CompilerOptions::default(),
    };

    let config_dir = config_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    // `outDir` is resolved relative to the config file, as the compiler does.
    options.out_dir = options
        .out_dir
        .map(|d| if d.is_absolute() { d } else { config_dir.join(d) });
    let file_names = expand_file_names(&raw, &config_dir, &options)?;

    tracing::debug!(
        config = %config_path.display(),
        files = file_names.len(),
        "compiler configuration loaded",
    );

    Ok(CompilerConfig {
        options,
        file_names,
        raw,
        config_path,
    })
}

fn string_array(raw: &serde_json::Value, key: &str) -> Option<Vec<String>> {
    raw.get(key).and_then(|v| v.as_array()).map(|items| {
        items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_owned))
            .collect()
    })
}

fn glob_set(patterns: &[String]) -> Result<GlobSet, ConfigError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| ConfigError::Pattern {
            pattern: pattern.clone(),
            source: e,
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| ConfigError::Pattern {
        pattern: patterns.join(","),
        source: e,
    })
}

fn expand_file_names(
    raw: &serde_json::Value,
    config_dir: &Path,
    options: &CompilerOptions,
) -> Result<Vec<PathBuf>, ConfigError> {
    let mut file_names: Vec<PathBuf> = string_array(raw, "files")
        .unwrap_or_default()
        .iter()
        .map(|f| config_dir.join(f))
        .collect();

    let explicit_include = string_array(raw, "include");
    // `files` alone (no `include`) disables glob expansion, as the compiler does.
    if explicit_include.is_none() && !file_names.is_empty() {
        file_names.sort();
        file_names.dedup();
        return Ok(file_names);
    }

    let include = explicit_include
        .unwrap_or_else(|| DEFAULT_INCLUDE.iter().map(|s| (*s).to_owned()).collect());
    let include_set = glob_set(&include)?;
    let exclude_set = glob_set(&string_array(raw, "exclude").unwrap_or_default())?;

    let out_dir = options.out_dir.clone();

    for entry in WalkDir::new(config_dir)
        .into_iter()
        .filter_entry(|e| {
            if e.file_name() == "node_modules" {
                return false;
            }
            match &out_dir {
                Some(out) => e.path() != out.as_path(),
                None => true,
            }
        })
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(config_dir) else {
            continue;
        };
        if include_set.is_match(relative) && !exclude_set.is_match(relative) {
            file_names.push(entry.path().to_path_buf());
        }
    }

    file_names.sort();
    file_names.dedup();
    Ok(file_names)
}

// ---------------------------------------------------------------------------
// JSONC stripping
// ---------------------------------------------------------------------------

/// Strip `//` and `/* */` comments and trailing commas so the document can be
/// fed to a strict JSON parser. String literals are respected.
fn strip_jsonc(text: &str) -> String {
    #[derive(PartialEq)]
    enum State {
        Code,
        Str { escaped: bool },
        LineComment,
        BlockComment,
    }

    let mut out = String::with_capacity(text.len());
    let mut state = State::Code;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match state {
            State::Code => match c {
                '"' => {
                    state = State::Str { escaped: false };
                    out.push(c);
                }
                '/' if chars.peek() == Some(&'/') => {
                    chars.next();
                    state = State::LineComment;
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    state = State::BlockComment;
                }
                _ => out.push(c),
            },
            State::Str { escaped } => {
                out.push(c);
                state = match c {
                    '\\' if !escaped => State::Str { escaped: true },
                    '"' if !escaped => State::Code,
                    _ => State::Str { escaped: false },
                };
            }
            State::LineComment => {
                if c == '\n' {
                    out.push(c);
                    state = State::Code;
                }
            }
            State::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    state = State::Code;
                }
            }
        }
    }

    strip_trailing_commas(&out)
}

fn strip_trailing_commas(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for c in text.chars() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '}' | ']' => {
                // Drop a comma that directly precedes a closer (whitespace aside).
                let trimmed_len = out.trim_end().len();
                if out[..trimmed_len].ends_with(',') {
                    out.replace_range(trimmed_len - 1..trimmed_len, "");
                }
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
