//! Error types for session storage and the conversation log.

use thiserror::Error;

/// Errors raised by [`crate::SessionStore`] or [`crate::ConversationLog`].
#[derive(Debug, Error)]
pub enum SessionError {
    /// The underlying key-value store failed.
    #[error(transparent)]
    Storage(#[from] wopr_storage::StorageError),

    /// A stored value could not be decoded.
    #[error("failed to decode stored value for '{key}': {source}")]
    Decode {
        /// The key whose value failed to decode.
        key: String,
        /// Underlying decode error.
        #[source]
        source: serde_json::Error,
    },

    /// A conversation log line could not be read or written.
    #[error("conversation log I/O error for session '{session}': {source}")]
    LogIo {
        /// The session whose log failed.
        session: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Result alias for session operations.
pub type SessionResult<T> = Result<T, SessionError>;
