//! Prelude module - commonly used types for convenient import.
//!
//! Use `use wopr_hooks::prelude::*;` to import all essential types.

// Context assembly pipeline
pub use crate::{
    AssembleOptions, AssembledContext, ContextContribution, ContextProvider, ContextProviderInfo,
    ContextRegistry, MessageInfo,
};

// Middleware chain
pub use crate::{ChainResult, HookOutcome, Middleware, MiddlewareChain, MiddlewareContext, MiddlewareInfo};

// Errors
pub use crate::HookError;
