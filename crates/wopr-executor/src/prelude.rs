//! Commonly used types for convenient import.
//!
//! ```
//! use wopr_executor::prelude::*;
//!
//! let normalized = normalize_payload(&serde_json::json!("hi"));
//! assert_eq!(normalized.text, "hi");
//! ```

// Pipeline entry point
pub use crate::InjectionExecutor;

// Supporting types
pub use crate::{
    annotate_images, compose_prompt, is_trivial_sender, normalize_payload, ImageAttachment,
    NormalizedMessage, SecurityContext,
};

// Errors
pub use crate::{ExecutorError, ExecutorResult};
