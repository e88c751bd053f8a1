//! WOPR Hooks - the context assembly pipeline and middleware chain.
//!
//! Two independent, priority-ordered registries feed the injection
//! executor:
//!
//! - [`ContextRegistry`] runs [`ContextProvider`]s to build the
//!   system prompt and context block prepended to a message.
//! - [`MiddlewareChain`] runs [`Middleware`]s over incoming and
//!   outgoing payloads, any of which may mutate the payload or
//!   short-circuit the injection by setting `prevented`.
//!
//! Both registries are fail-open: a provider or middleware that errors
//! is logged and skipped rather than aborting the injection.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use wopr_hooks::{ContextContribution, ContextProvider, ContextRegistry, MessageInfo, AssembleOptions, HookError};
//!
//! struct Clock;
//!
//! #[async_trait]
//! impl ContextProvider for Clock {
//!     fn name(&self) -> &str {
//!         "clock"
//!     }
//!
//!     async fn provide(&self, _session: &str, _message: &MessageInfo) -> Result<ContextContribution, HookError> {
//!         Ok(ContextContribution::system("Current time: 2026-07-28T00:00:00Z"))
//!     }
//! }
//!
//! # async fn example() {
//! let registry = ContextRegistry::new();
//! registry.register(Arc::new(Clock), 10);
//!
//! let assembled = registry
//!     .assemble("alice", &MessageInfo::new("hi", "cli"), &AssembleOptions::all())
//!     .await;
//! assert_eq!(assembled.system, "Current time: 2026-07-28T00:00:00Z");
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod error;
mod middleware;
mod provider;

pub use error::HookError;
pub use middleware::{ChainResult, HookOutcome, Middleware, MiddlewareChain, MiddlewareContext, MiddlewareInfo};
pub use provider::{
    AssembleOptions, AssembledContext, ContextContribution, ContextProvider, ContextProviderInfo,
    ContextRegistry, MessageInfo,
};
