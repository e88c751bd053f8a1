//! Commonly used types for convenient import.
//!
//! ```
//! use std::sync::Arc;
//! use wopr_llm::prelude::*;
//!
//! # async fn example() -> LlmResult<()> {
//! let registry = ProviderRegistry::new();
//! registry.register("echo", Arc::new(EchoProvider::default()));
//!
//! let resolved = registry.resolve_provider(&ResolveConfig::single("echo"))?;
//! let response = resolved.provider.complete_simple("hi").await?;
//! println!("{response}");
//! # Ok(())
//! # }
//! ```

// Errors
pub use crate::{LlmError, LlmResult};

// Provider trait and config
pub use crate::{LlmProvider, ProviderConfig, StreamBox};

// Registry & resolution
pub use crate::{EchoProvider, ProviderRegistry, ResolveConfig, ResolvedProvider};

// Message types
pub use crate::{ContentPart, Message, MessageContent, MessageRole};

// Response types
pub use crate::{LlmResponse, StopReason, StreamEvent, Usage};

// Tool types
pub use crate::{LlmToolDefinition, ToolCall, ToolCallResult};
