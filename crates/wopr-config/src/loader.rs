//! Config file discovery and loading.
//!
//! Implements `Config::load()`:
//! 1. Start from compiled defaults (`Config::default()` as a TOML tree).
//! 2. Merge `{home}/config.toml`, if present.
//! 3. Merge env var overlays for unset fields.
//! 4. Deserialize the merged tree back into [`Config`].

use std::path::Path;

use tracing::{debug, info};

use crate::env::http_overlay;
use crate::error::{ConfigError, ConfigResult};
use crate::merge::deep_merge;
use crate::types::Config;

/// Maximum allowed config file size (1 MB), matching the limit every
/// other file the daemon parses on startup uses.
const MAX_CONFIG_FILE_SIZE: u64 = 1_048_576;

/// Load configuration for the daemon rooted at `home`.
///
/// # Errors
///
/// Returns a [`ConfigError`] if `{home}/config.toml` exists but cannot
/// be read or parsed.
pub fn load(home: &Path) -> ConfigResult<Config> {
    let mut merged = toml::Value::try_from(Config::default())
        .expect("Config::default() always serializes to a TOML table");

    let config_path = home.join("config.toml");
    if let Some(overlay) = try_load_file(&config_path)? {
        deep_merge(&mut merged, &overlay);
        info!(path = %config_path.display(), "loaded daemon config");
    } else {
        debug!(path = %config_path.display(), "no daemon config file, using defaults");
    }

    if let Some(overlay) = http_overlay() {
        deep_merge(&mut merged, &overlay);
        debug!("applied WOPR_HTTP_* environment overlay");
    }

    merged
        .try_into()
        .map_err(|e: toml::de::Error| ConfigError::ParseError {
            path: "<merged config>".to_owned(),
            source: e,
        })
}

/// Load a config from a specific file path (no layering, no env overlay).
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read or parsed.
pub fn load_file(path: &Path) -> ConfigResult<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    toml::from_str(&content).map_err(|e| ConfigError::ParseError {
        path: path.display().to_string(),
        source: e,
    })
}

/// Try to load a file, returning `None` if it doesn't exist.
fn try_load_file(path: &Path) -> ConfigResult<Option<toml::Value>> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(ConfigError::ReadError {
                path: path.display().to_string(),
                source: e,
            });
        }
    };

    if content.len() as u64 > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::ValidationError {
            field: path.display().to_string(),
            message: format!(
                "config file is {} bytes, exceeding the {MAX_CONFIG_FILE_SIZE} byte limit",
                content.len()
            ),
        });
    }

    toml::from_str(&content)
        .map(Some)
        .map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            source: e,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_without_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load(dir.path()).unwrap();
        assert_eq!(config.http.port, 4173);
    }

    #[test]
    fn test_load_merges_file_overlay() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.toml"), "[http]\nport = 9000\n").unwrap();

        let config = load(dir.path()).unwrap();
        assert_eq!(config.http.port, 9000);
        assert_eq!(config.http.host, "127.0.0.1");
    }

    #[test]
    fn test_load_file_nonexistent() {
        let result = load_file(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(ConfigError::ReadError { .. })));
    }

    #[test]
    fn test_oversized_config_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("config.toml");
        let data = "x = \"".to_owned() + &"a".repeat(1_100_000) + "\"";
        std::fs::write(&file_path, data).unwrap();

        let result = try_load_file(&file_path);
        assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
    }
}
