//! Error types for tsbolt-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while locating, parsing, or resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure (file not found, permission denied, etc.).
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No compiler configuration file could be located in the start directory
    /// or any of its ancestors. Fatal; aborts before any build step.
    #[error("no {file_name} found in {} or any parent directory", start_dir.display())]
    ConfigNotFound { file_name: String, start_dir: PathBuf },

    /// Compiler configuration parse error with file path and serde context.
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The named user-configuration file cannot be read or is not valid JSON.
    /// Fatal; aborts before any build step.
    #[error("failed to load user config {}: {reason}", path.display())]
    UserConfig { path: PathBuf, reason: String },

    /// A glob pattern in the configuration does not compile.
    #[error("invalid glob pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ConfigError {
    ConfigError::Io {
        path: path.into(),
        source,
    }
}
