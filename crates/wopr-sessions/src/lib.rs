//! The session store (§4.1) and append-only conversation log (§4.2).
//!
//! ```
//! use std::sync::Arc;
//! use wopr_sessions::{ConversationLog, SessionStore};
//! use wopr_storage::MemoryKvStore;
//!
//! # async fn example() -> wopr_sessions::SessionResult<()> {
//! let store = SessionStore::new(Arc::new(MemoryKvStore::new()));
//! store.save_session_id("alice", "conv-1").await?;
//! assert_eq!(store.get_sessions().await?.get("alice"), Some(&"conv-1".to_string()));
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod error;
mod log;
mod store;
mod types;

pub use error::{SessionError, SessionResult};
pub use log::ConversationLog;
pub use store::SessionStore;
pub use types::{ConversationEntry, EntryKind, ProviderSelection, SessionInfo};
