//! LLM provider abstraction with streaming support, plus the provider
//! registry and fallback resolver described in §4.7.
//!
//! ```
//! use std::sync::Arc;
//! use wopr_llm::{EchoProvider, ProviderRegistry, ResolveConfig};
//!
//! let registry = ProviderRegistry::new();
//! registry.register("echo", Arc::new(EchoProvider::default()));
//!
//! let resolved = registry.resolve_provider(&ResolveConfig::single("echo")).unwrap();
//! assert_eq!(resolved.name, "echo");
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod echo;
mod error;
mod provider;
mod registry;
mod types;

pub use echo::EchoProvider;
pub use error::{LlmError, LlmResult};
pub use provider::{LlmProvider, ProviderConfig, StreamBox};
pub use registry::{ProviderRegistry, ResolveConfig, ResolvedProvider};
pub use types::{
    ContentPart, LlmResponse, LlmToolDefinition, Message, MessageContent, MessageRole, StopReason,
    StreamEvent, ToolCall, ToolCallResult, Usage,
};
