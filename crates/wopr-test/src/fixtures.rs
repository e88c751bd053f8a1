//! Tempdir-backed fixtures shared across the workspace's test suites.

use wopr_core::{InjectionSource, InjectionSourceKind, WoprHome};

/// Build a fresh, `ensure()`d [`WoprHome`] rooted in a new temp directory.
///
/// The returned [`tempfile::TempDir`] must be kept alive for as long as
/// the [`WoprHome`] is in use; it deletes the directory on drop.
///
/// # Panics
///
/// Panics if the temp directory cannot be created or scaffolded — a
/// test-environment failure, not something tests should recover from.
#[must_use]
pub fn temp_wopr_home() -> (tempfile::TempDir, WoprHome) {
    let dir = tempfile::tempdir().expect("create temp dir for WoprHome fixture");
    let home = WoprHome::from_path(dir.path());
    home.ensure().expect("scaffold WoprHome directory layout");
    (dir, home)
}

/// Build an [`InjectionSource`] of the given kind with a fixed test
/// origin and no extra grants, for tests exercising the security policy
/// engine's default-trust-level resolution.
#[must_use]
pub fn test_injection_source(kind: InjectionSourceKind) -> InjectionSource {
    InjectionSource { kind, origin: "test-origin".to_string(), granted_capabilities: Vec::new(), trust_override: None }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_wopr_home_is_usable() {
        let (_dir, home) = temp_wopr_home();
        assert!(home.sessions_dir().exists());
    }

    #[test]
    fn test_injection_source_carries_kind() {
        let source = test_injection_source(InjectionSourceKind::P2p);
        assert_eq!(source.kind, InjectionSourceKind::P2p);
    }
}
