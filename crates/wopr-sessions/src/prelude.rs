//! Commonly used types for convenient import.
//!
//! ```
//! use std::sync::Arc;
//! use wopr_sessions::prelude::*;
//! use wopr_storage::MemoryKvStore;
//!
//! # async fn example() -> SessionResult<()> {
//! let store = SessionStore::new(Arc::new(MemoryKvStore::new()));
//! let log = ConversationLog::new("/tmp/wopr-example-sessions");
//! log.log_message("alice", "alice", "hi", EntryKind::Message)?;
//! # Ok(())
//! # }
//! ```

// Session store
pub use crate::{ProviderSelection, SessionInfo, SessionStore};

// Conversation log
pub use crate::{ConversationEntry, ConversationLog, EntryKind};

// Errors
pub use crate::{SessionError, SessionResult};
