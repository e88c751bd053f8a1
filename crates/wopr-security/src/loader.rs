//! Loading and saving `security.json` under `$WOPR_HOME`.

use std::path::{Path, PathBuf};

use crate::error::{SecurityError, SecurityResult};
use crate::types::SecurityConfig;

/// The file name of the persisted security policy, relative to
/// `$WOPR_HOME`.
pub const SECURITY_FILE_NAME: &str = "security.json";

/// Resolve `security.json`'s path under `home`.
#[must_use]
pub fn security_file_path(home: &Path) -> PathBuf {
    home.join(SECURITY_FILE_NAME)
}

/// Load `security.json` from `home`, or fall back to
/// [`SecurityConfig::default`] if it does not exist.
///
/// # Errors
///
/// Returns [`SecurityError::ReadError`] if the file exists but cannot be
/// read, or [`SecurityError::ParseError`] if it exists but is not valid
/// JSON matching [`SecurityConfig`].
pub fn load(home: &Path) -> SecurityResult<SecurityConfig> {
    let path = security_file_path(home);
    if !path.exists() {
        return Ok(SecurityConfig::default());
    }

    let raw = std::fs::read_to_string(&path).map_err(|source| SecurityError::ReadError {
        path: path.display().to_string(),
        source,
    })?;

    serde_json::from_str(&raw).map_err(|source| SecurityError::ParseError {
        path: path.display().to_string(),
        source,
    })
}

/// Persist `config` to `security.json` under `home`, pretty-printed.
///
/// # Errors
///
/// Returns [`SecurityError::WriteError`] if the file cannot be written.
pub fn save(home: &Path, config: &SecurityConfig) -> SecurityResult<()> {
    let path = security_file_path(home);
    let serialized = serde_json::to_string_pretty(config).map_err(|source| SecurityError::ParseError {
        path: path.display().to_string(),
        source,
    })?;

    std::fs::write(&path, serialized).map_err(|source| SecurityError::WriteError {
        path: path.display().to_string(),
        source,
    })
}
