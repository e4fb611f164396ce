//! User-configuration loader.
//!
//! The user config is a strict-JSON document (`tsbolt.config.json` by
//! default). Every field is optional; an absent *default* file is the same as
//! an empty one, but a file named explicitly on the command line must exist.

use std::path::Path;

use crate::error::ConfigError;
use crate::types::UserConfig;

pub const DEFAULT_CONFIG_FILE: &str = "tsbolt.config.json";

/// Load the user configuration from `path`. The file must exist.
pub fn load(path: &Path) -> Result<UserConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|e| ConfigError::UserConfig {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    serde_json::from_str(&text).map_err(|e| ConfigError::UserConfig {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Load the user configuration, treating a missing file as empty defaults.
pub fn load_or_default(path: &Path) -> Result<UserConfig, ConfigError> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no user config file; using defaults");
        return Ok(UserConfig::default());
    }
    load(path)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
