//! Error types for tsbolt-assets.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from asset copying or output clearing.
#[derive(Debug, Error)]
pub enum AssetError {
    /// Underlying I/O failure (permission denied, disk full, etc.).
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An asset pattern does not compile as a glob.
    #[error("invalid asset pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    /// Directory traversal failure while scanning the asset base directory.
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> AssetError {
    AssetError::Io {
        path: path.into(),
        source,
    }
}
