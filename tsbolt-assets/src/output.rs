//! Output-directory clearing.

use std::io::ErrorKind;
use std::path::Path;

use crate::error::{io_err, AssetError};

/// Remove the output directory tree, if present.
///
/// Idempotent: an already-absent directory is success. Runs synchronously
/// before any build work starts, guaranteeing an empty output tree.
pub fn clear_output(dir: &Path) -> Result<(), AssetError> {
    match std::fs::remove_dir_all(dir) {
        Ok(()) => {
            tracing::debug!(dir = %dir.display(), "cleared output directory");
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(io_err(dir, e)),
    }
}
