//! Commonly used types for convenient import.
//!
//! ```
//! use wopr_security::prelude::*;
//!
//! let engine = PolicyEngine::new(SecurityConfig::permissive());
//! ```

// Policy engine
pub use crate::{default_trust_level, has_capability, PolicyEngine};

// Data model
pub use crate::{
    CheckOutcome, ForwardRules, GlobalDefaults, RateLimit, ResolvedPolicy, SandboxSettings,
    SecurityConfig, SessionFilter, SessionOverride, TrustPolicy,
};

// Persistence
pub use crate::{load, save, security_file_path, SECURITY_FILE_NAME};

// Errors
pub use crate::{SecurityError, SecurityResult};
