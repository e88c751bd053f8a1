//! The injection executor (§4.6): the fifteen-step pipeline that turns one
//! queued [`wopr_queue::InjectPayload`] into a provider response, wiring
//! together security, context assembly, middleware, the session store and
//! log, provider resolution, and the audit trail.
//!
//! ```
//! use std::sync::Arc;
//! use wopr_audit::AuditLog;
//! use wopr_events::EventBus;
//! use wopr_executor::InjectionExecutor;
//! use wopr_hooks::{ContextRegistry, MiddlewareChain};
//! use wopr_llm::{EchoProvider, ProviderRegistry};
//! use wopr_queue::{Executor as _, InjectPayload};
//! use wopr_security::{PolicyEngine, SecurityConfig};
//! use wopr_sessions::{ConversationLog, SessionStore};
//! use wopr_storage::MemoryKvStore;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let providers = Arc::new(ProviderRegistry::new());
//! providers.register("echo", Arc::new(EchoProvider::new("echo-model")));
//!
//! let executor = InjectionExecutor::new(
//!     Arc::new(PolicyEngine::new(SecurityConfig::permissive())),
//!     Arc::new(ContextRegistry::new()),
//!     Arc::new(MiddlewareChain::new()),
//!     Arc::new(SessionStore::new(Arc::new(MemoryKvStore::new()))),
//!     Arc::new(ConversationLog::new("/tmp/wopr-example-executor")),
//!     providers,
//!     Arc::new(EventBus::new()),
//!     Arc::new(AuditLog::new("/tmp/wopr-example-executor/audit.jsonl")),
//!     &wopr_config::ExecutorConfig::default(),
//! );
//!
//! let payload = InjectPayload::new(serde_json::json!("hello"), "cli");
//! let result = executor.execute("alice", payload, CancellationToken::new()).await?;
//! assert_eq!(result.response, "hello");
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
mod executor;
mod types;

pub use error::{ExecutorError, ExecutorResult};
pub use executor::InjectionExecutor;
pub use types::{
    annotate_images, compose_prompt, is_trivial_sender, normalize_payload, ImageAttachment,
    NormalizedMessage, SecurityContext,
};
