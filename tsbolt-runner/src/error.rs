//! Error types for tsbolt-runner.

use std::path::PathBuf;

use thiserror::Error;

/// Error surface for orchestration and watch coordination.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("notify error: {0}")]
    Notify(#[from] notify::Error),

    #[error("asset error: {0}")]
    Asset(#[from] tsbolt_assets::AssetError),

    #[error("engine error: {0}")]
    Engine(#[from] tsbolt_engine::EngineError),

    #[error("task join failure: {0}")]
    Join(String),
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RunnerError {
    RunnerError::Io {
        path: path.into(),
        source,
    }
}
