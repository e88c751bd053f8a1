//! Configuration error types.

use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a config file that exists but is unreadable.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// The path that could not be read.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A config file failed to parse as TOML.
    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        /// The path that failed to parse.
        path: String,
        /// The underlying TOML error.
        #[source]
        source: toml::de::Error,
    },

    /// A field failed post-merge validation.
    #[error("invalid value for {field}: {message}")]
    ValidationError {
        /// The dotted field path.
        field: String,
        /// Why it's invalid.
        message: String,
    },
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
