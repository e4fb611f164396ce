//! tsbolt — bridge a type-checked compiler configuration to a fast bundler.
//!
//! # Usage
//!
//! ```text
//! tsbolt [--config <path>]
//! ```
//!
//! One-shot by default; set `"watch": true` in the user config to build and
//! keep rebuilding on filesystem changes until the process is terminated.
//! Exit code 0 on success, 1 on any resolution or build failure.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use tsbolt_core::{resolver, tsconfig, userconfig, UserConfig};
use tsbolt_engine::EsbuildCli;
use tsbolt_runner::{start_blocking, BuildMode};

#[derive(Parser, Debug)]
#[command(
    name = "tsbolt",
    version,
    about = "Build TypeScript projects with esbuild, driven by tsconfig",
    long_about = None,
)]
struct Cli {
    /// Path to the user configuration file (default: tsbolt.config.json).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let cwd = std::env::current_dir().context("could not determine working directory")?;
    run(cli, &cwd)
}

/// The working directory is an explicit parameter, never re-read from
/// ambient process state below this point.
fn run(cli: Cli, cwd: &Path) -> Result<()> {
    let user = load_user_config(&cli, cwd)?;

    let ts_config_file = user
        .ts_config_file
        .clone()
        .unwrap_or_else(|| tsconfig::DEFAULT_TSCONFIG_FILE.to_owned());
    let compiler = tsconfig::load(cwd, &ts_config_file)?;

    let plan = resolver::resolve_plan(&compiler, &user);
    let mode = if user.watch.unwrap_or(false) {
        BuildMode::Watch
    } else {
        BuildMode::Once
    };

    let engine = match std::env::var_os("TSBOLT_ESBUILD_PATH") {
        Some(binary) => EsbuildCli::with_binary(binary),
        None => EsbuildCli::default(),
    };

    start_blocking(&engine, &plan, mode)?;
    Ok(())
}

fn load_user_config(cli: &Cli, cwd: &Path) -> Result<UserConfig> {
    match &cli.config {
        // An explicitly named config file must exist.
        Some(path) => {
            let path = if path.is_absolute() {
                path.clone()
            } else {
                cwd.join(path)
            };
            Ok(userconfig::load(&path)?)
        }
        // The default-named file is optional.
        None => Ok(userconfig::load_or_default(
            &cwd.join(userconfig::DEFAULT_CONFIG_FILE),
        )?),
    }
}
