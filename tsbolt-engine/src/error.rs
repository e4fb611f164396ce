//! Error types for tsbolt-engine.

use std::path::PathBuf;

use thiserror::Error;

/// All errors a build engine can report.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine binary could not be launched at all.
    #[error("failed to launch build engine '{}': {source}", binary.display())]
    Spawn {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The engine ran and reported a compile/bundle failure.
    #[error("build failed:\n{stderr}")]
    BuildFailed { stderr: String },
}
