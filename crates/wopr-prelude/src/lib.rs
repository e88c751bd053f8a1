//! Unified prelude for the WOPR daemon workspace.
//!
//! This crate provides a single import to bring in the commonly used
//! types from across the workspace. Use this when a binary or
//! integration test needs types from several `wopr-*` crates without
//! managing individual imports.
//!
//! # Usage
//!
//! ```rust,ignore
//! use wopr_prelude::*;
//!
//! // Now you have access to types from:
//! // - wopr-core (home directory layout, identity, shared primitives)
//! // - wopr-config (daemon configuration)
//! // - wopr-storage (the key-value persistence trait)
//! // - wopr-events (the event bus and topic matching)
//! // - wopr-hooks (context assembly and the middleware chain)
//! // - wopr-security (the capability policy engine)
//! // - wopr-llm (provider trait, registry, messages)
//! // - wopr-sessions (session store and conversation log)
//! // - wopr-audit (the audit trail)
//! // - wopr-queue (the per-session injection queue)
//! // - wopr-executor (the injection pipeline)
//! // - wopr-scheduler (cron and one-shot triggers)
//! // - wopr-telemetry (logging setup and request context)
//! ```
//!
//! # Per-Crate Preludes
//!
//! If you only need types from a specific crate, use its own prelude:
//!
//! ```rust,ignore
//! use wopr_core::prelude::*;
//! use wopr_security::prelude::*;
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use wopr_prelude::*;
//!
//! # async fn example() -> CoreResult<()> {
//! let home = WoprHome::resolve()?;
//! home.ensure()?;
//!
//! let store: Arc<dyn KvStore> = Arc::new(FileKvStore::new(home.root().join("sessions")));
//! let sessions = SessionStore::new(store);
//!
//! let events = EventBus::new();
//! let queue = QueueManager::new(events.clone());
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

// Re-export every workspace crate's own prelude where one exists.
pub use wopr_audit::prelude::*;
pub use wopr_core::prelude::*;
pub use wopr_events::prelude::*;
pub use wopr_executor::prelude::*;
pub use wopr_hooks::prelude::*;
pub use wopr_llm::prelude::*;
pub use wopr_queue::prelude::*;
pub use wopr_scheduler::prelude::*;
pub use wopr_security::prelude::*;
pub use wopr_sessions::prelude::*;
pub use wopr_telemetry::prelude::*;

// wopr-config and wopr-storage have no prelude module of their own; their
// public surface is small enough to re-export directly.
pub use wopr_config::{Config, ConfigError, ConfigResult, EnforcementLevel, ExecutorConfig, GatewayConfig, HttpConfig};
pub use wopr_storage::{FileKvStore, KvStore, MemoryKvStore, StorageError, StorageResult};
