//! Logging setup backed by `tracing`/`tracing-subscriber`.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::error::{TelemetryError, TelemetryResult};

/// Output rendering for log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line, human-readable output (good for a terminal).
    #[default]
    Pretty,
    /// Single-line compact output.
    Compact,
    /// Newline-delimited JSON, one object per line.
    Json,
}

/// Where log lines are written.
#[derive(Debug, Clone, Default)]
pub enum LogTarget {
    /// Standard error (the default; keeps stdout free for daemon output).
    #[default]
    Stderr,
    /// A file path, opened in append mode.
    File(std::path::PathBuf),
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Base level filter (e.g. `"info"`, `"debug"`), used when `RUST_LOG`
    /// is unset.
    pub level: String,
    /// Output rendering.
    pub format: LogFormat,
    /// Output destination.
    pub target: LogTarget,
    /// Extra per-module directives appended to the filter (e.g.
    /// `"wopr_queue=trace"`).
    pub directives: Vec<String>,
}

impl LogConfig {
    /// Start a config at the given base level, pretty format, stderr
    /// target, and no extra directives.
    #[must_use]
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            format: LogFormat::default(),
            target: LogTarget::default(),
            directives: Vec::new(),
        }
    }

    /// Set the output format.
    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the output target.
    #[must_use]
    pub fn with_target(mut self, target: LogTarget) -> Self {
        self.target = target;
        self
    }

    /// Append an extra per-module filter directive.
    #[must_use]
    pub fn with_directive(mut self, directive: impl Into<String>) -> Self {
        self.directives.push(directive.into());
        self
    }

    fn env_filter(&self) -> TelemetryResult<EnvFilter> {
        if let Ok(from_env) = std::env::var("RUST_LOG") {
            return EnvFilter::try_new(from_env)
                .map_err(|e| TelemetryError::ConfigError(e.to_string()));
        }

        let mut spec = self.level.clone();
        for directive in &self.directives {
            spec.push(',');
            spec.push_str(directive);
        }
        EnvFilter::try_new(spec).map_err(|e| TelemetryError::ConfigError(e.to_string()))
    }
}

/// Install a global `tracing` subscriber per `config`.
///
/// This is the single entry point the daemon binary calls once from
/// `main`, before any other subsystem logs anything.
///
/// # Errors
///
/// Returns [`TelemetryError::ConfigError`] if the filter spec is
/// malformed, or [`TelemetryError::InitError`] if a global subscriber is
/// already installed.
pub fn setup_logging(config: &LogConfig) -> TelemetryResult<()> {
    let filter = config.env_filter()?;

    let registry = tracing_subscriber::registry().with(filter);

    let result = match (&config.format, &config.target) {
        (LogFormat::Json, LogTarget::Stderr) => {
            registry.with(fmt::layer().json().with_writer(std::io::stderr)).try_init()
        }
        (LogFormat::Compact, LogTarget::Stderr) => {
            registry.with(fmt::layer().compact().with_writer(std::io::stderr)).try_init()
        }
        (LogFormat::Pretty, LogTarget::Stderr) => {
            registry.with(fmt::layer().pretty().with_writer(std::io::stderr)).try_init()
        }
        (format, LogTarget::File(path)) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(TelemetryError::IoError)?;
            match format {
                LogFormat::Json => registry.with(fmt::layer().json().with_writer(file)).try_init(),
                LogFormat::Compact => {
                    registry.with(fmt::layer().compact().with_writer(file)).try_init()
                }
                LogFormat::Pretty => {
                    registry.with(fmt::layer().with_ansi(false).with_writer(file)).try_init()
                }
            }
        }
    };

    result.map_err(|e| TelemetryError::InitError(e.to_string()))
}

/// Install a default subscriber: `info` level, pretty format, stderr,
/// honoring `RUST_LOG` if set.
///
/// # Errors
///
/// See [`setup_logging`].
pub fn setup_default_logging() -> TelemetryResult<()> {
    setup_logging(&LogConfig::new("info"))
}
