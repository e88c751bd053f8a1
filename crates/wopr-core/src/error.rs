//! Cross-cutting error types shared by every crate that touches the
//! filesystem layout or session naming rules. Component-specific errors
//! (security, provider, queue, executor) live in their own crates.

use thiserror::Error;

/// Errors raised by core, non-component-specific operations (directory
/// resolution, session-name validation).
#[derive(Debug, Error)]
pub enum CoreError {
    /// I/O failure while touching the WOPR home directory.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// `WOPR_HOME` was set but is not an absolute path.
    #[error("WOPR_HOME must be an absolute path")]
    HomeNotAbsolute,

    /// Neither `WOPR_HOME` nor `HOME` is set.
    #[error("neither WOPR_HOME nor HOME environment variable is set")]
    HomeUnresolved,

    /// A session name failed the filesystem-safe validation rule.
    #[error("invalid session name {name:?}: {reason}")]
    InvalidSessionName {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        reason: &'static str,
    },
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_session_name_display() {
        let err = CoreError::InvalidSessionName {
            name: "../etc".to_string(),
            reason: "must not contain path separators",
        };
        assert!(err.to_string().contains("../etc"));
    }
}
