//! Convenience re-export of this crate's public surface.

pub use crate::{FakeClock, ScriptedProvider, ScriptedStep, temp_wopr_home, test_injection_source};
