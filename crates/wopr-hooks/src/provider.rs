//! Context assembly pipeline (§4.4).
//!
//! A registry of named [`ContextProvider`]s, each with a `priority`
//! (lower runs earlier) and an `enabled` flag, both live-editable at
//! runtime. [`ContextRegistry::assemble`] runs the enabled providers in
//! priority order and concatenates their contributions into the system
//! prompt and context block handed to the injection executor.

use std::sync::Arc;
use std::sync::RwLock;

use async_trait::async_trait;
use tracing::warn;

use crate::error::HookError;

/// Information about the message a context assembly is being built for.
#[derive(Debug, Clone)]
pub struct MessageInfo {
    /// The raw message text about to be sent to the provider.
    pub text: String,
    /// Who triggered the injection (`cli`, `daemon`, a plugin name, ...).
    pub from: String,
}

impl MessageInfo {
    /// Construct a new `MessageInfo`.
    #[must_use]
    pub fn new(text: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            from: from.into(),
        }
    }
}

/// What a single provider contributes to one assembly.
#[derive(Debug, Clone, Default)]
pub struct ContextContribution {
    /// Text appended to the system prompt.
    pub system_addition: Option<String>,
    /// Text appended to the context block.
    pub context_addition: Option<String>,
}

impl ContextContribution {
    /// A contribution with nothing to add.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// A contribution that only adds to the system prompt.
    #[must_use]
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            system_addition: Some(text.into()),
            context_addition: None,
        }
    }

    /// A contribution that only adds to the context block.
    #[must_use]
    pub fn context(text: impl Into<String>) -> Self {
        Self {
            system_addition: None,
            context_addition: Some(text.into()),
        }
    }
}

/// A named source of context, run in priority order during assembly.
///
/// Providers run single-threaded within one assembly: each waits for
/// the previous to complete before starting, so a provider that reads
/// session state can observe side effects left by an earlier provider
/// in the same priority order. Across separate assemblies, providers
/// are independent.
#[async_trait]
pub trait ContextProvider: Send + Sync {
    /// Stable name identifying this provider in `sources[]` and logs.
    fn name(&self) -> &str;

    /// Produce this provider's contribution for `session`/`message`.
    async fn provide(
        &self,
        session: &str,
        message: &MessageInfo,
    ) -> Result<ContextContribution, HookError>;
}

struct ProviderEntry {
    priority: i32,
    enabled: bool,
    provider: Arc<dyn ContextProvider>,
}

/// Options restricting which providers run in one assembly.
#[derive(Debug, Clone, Default)]
pub struct AssembleOptions {
    /// If set, only providers named here run (their registered priority
    /// order is preserved regardless of this list's order).
    pub providers: Option<Vec<String>>,
}

impl AssembleOptions {
    /// Run every enabled provider.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict the assembly to `names`.
    #[must_use]
    pub fn whitelist(names: Vec<String>) -> Self {
        Self {
            providers: Some(names),
        }
    }
}

/// Result of one context assembly.
#[derive(Debug, Clone, Default)]
pub struct AssembledContext {
    /// Ordered join of every contributing provider's `system_addition`.
    pub system: String,
    /// Ordered join of every contributing provider's `context_addition`.
    pub context: String,
    /// Names of providers that produced non-empty output.
    pub sources: Vec<String>,
    /// Warnings collected from providers that errored.
    pub warnings: Vec<String>,
}

/// One context provider's registered name, priority, and enabled state,
/// for the HTTP `/api/context` listing.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ContextProviderInfo {
    /// Registered name.
    pub name: String,
    /// Run order (lower runs earlier).
    pub priority: i32,
    /// Whether this provider currently participates in assembly.
    pub enabled: bool,
}

/// Registry of context providers.
#[derive(Default)]
pub struct ContextRegistry {
    entries: RwLock<Vec<(String, ProviderEntry)>>,
}

impl std::fmt::Debug for ContextRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.entries.read().map(|e| e.len()).unwrap_or_default();
        f.debug_struct("ContextRegistry").field("count", &count).finish()
    }
}

impl ContextRegistry {
    /// Construct an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider, replacing any prior registration with the
    /// same name.
    pub fn register(&self, provider: Arc<dyn ContextProvider>, priority: i32) {
        let name = provider.name().to_string();
        let mut entries = self.entries.write().expect("context registry lock poisoned");
        entries.retain(|(existing, _)| existing != &name);
        entries.push((
            name,
            ProviderEntry {
                priority,
                enabled: true,
                provider,
            },
        ));
    }

    /// Remove a provider by name.
    pub fn unregister(&self, name: &str) {
        let mut entries = self.entries.write().expect("context registry lock poisoned");
        entries.retain(|(existing, _)| existing != name);
    }

    /// Enable or disable a provider by name. Returns `false` if no such
    /// provider is registered.
    pub fn set_enabled(&self, name: &str, enabled: bool) -> bool {
        let mut entries = self.entries.write().expect("context registry lock poisoned");
        match entries.iter_mut().find(|(existing, _)| existing == name) {
            Some((_, entry)) => {
                entry.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Change a provider's priority. Returns `false` if no such provider
    /// is registered.
    pub fn set_priority(&self, name: &str, priority: i32) -> bool {
        let mut entries = self.entries.write().expect("context registry lock poisoned");
        match entries.iter_mut().find(|(existing, _)| existing == name) {
            Some((_, entry)) => {
                entry.priority = priority;
                true
            }
            None => false,
        }
    }

    /// Every registered provider's name, priority, and enabled state,
    /// sorted by priority.
    #[must_use]
    pub fn list(&self) -> Vec<ContextProviderInfo> {
        let entries = self.entries.read().expect("context registry lock poisoned");
        let mut info: Vec<ContextProviderInfo> = entries
            .iter()
            .map(|(name, entry)| ContextProviderInfo {
                name: name.clone(),
                priority: entry.priority,
                enabled: entry.enabled,
            })
            .collect();
        info.sort_by_key(|entry| entry.priority);
        info
    }

    /// Run the assembly against `opts`.
    pub async fn assemble(
        &self,
        session: &str,
        message: &MessageInfo,
        opts: &AssembleOptions,
    ) -> AssembledContext {
        let mut snapshot: Vec<(String, i32, Arc<dyn ContextProvider>)> = {
            let entries = self.entries.read().expect("context registry lock poisoned");
            entries
                .iter()
                .filter(|(_, entry)| entry.enabled)
                .filter(|(name, _)| match &opts.providers {
                    Some(whitelist) => whitelist.iter().any(|w| w == name),
                    None => true,
                })
                .map(|(name, entry)| (name.clone(), entry.priority, Arc::clone(&entry.provider)))
                .collect()
        };
        snapshot.sort_by_key(|(_, priority, _)| *priority);

        let mut result = AssembledContext::default();
        let mut system_parts = Vec::new();
        let mut context_parts = Vec::new();

        for (name, _, provider) in snapshot {
            match provider.provide(session, message).await {
                Ok(contribution) => {
                    let mut produced = false;
                    if let Some(system) = contribution.system_addition {
                        if !system.is_empty() {
                            system_parts.push(system);
                            produced = true;
                        }
                    }
                    if let Some(context) = contribution.context_addition {
                        if !context.is_empty() {
                            context_parts.push(context);
                            produced = true;
                        }
                    }
                    if produced {
                        result.sources.push(name);
                    }
                }
                Err(err) => {
                    warn!(provider = %name, error = %err, "context provider failed, skipping");
                    result.warnings.push(format!("{name}: {err}"));
                }
            }
        }

        result.system = system_parts.join("\n\n");
        result.context = context_parts.join("\n\n");
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticProvider {
        name: &'static str,
        contribution: ContextContribution,
    }

    #[async_trait]
    impl ContextProvider for StaticProvider {
        fn name(&self) -> &str {
            self.name
        }

        async fn provide(
            &self,
            _session: &str,
            _message: &MessageInfo,
        ) -> Result<ContextContribution, HookError> {
            Ok(self.contribution.clone())
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl ContextProvider for FailingProvider {
        fn name(&self) -> &str {
            "failing"
        }

        async fn provide(
            &self,
            _session: &str,
            _message: &MessageInfo,
        ) -> Result<ContextContribution, HookError> {
            Err(HookError::Provider("boom".to_string()))
        }
    }

    fn message() -> MessageInfo {
        MessageInfo::new("hello", "cli")
    }

    #[tokio::test]
    async fn test_assemble_orders_by_priority() {
        let registry = ContextRegistry::new();
        registry.register(
            Arc::new(StaticProvider {
                name: "second",
                contribution: ContextContribution::system("B"),
            }),
            20,
        );
        registry.register(
            Arc::new(StaticProvider {
                name: "first",
                contribution: ContextContribution::system("A"),
            }),
            10,
        );

        let assembled = registry.assemble("alice", &message(), &AssembleOptions::all()).await;
        assert_eq!(assembled.system, "A\n\nB");
        assert_eq!(assembled.sources, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_assemble_skips_disabled() {
        let registry = ContextRegistry::new();
        registry.register(
            Arc::new(StaticProvider {
                name: "quiet",
                contribution: ContextContribution::system("nope"),
            }),
            10,
        );
        registry.set_enabled("quiet", false);

        let assembled = registry.assemble("alice", &message(), &AssembleOptions::all()).await;
        assert_eq!(assembled.system, "");
        assert!(assembled.sources.is_empty());
    }

    #[tokio::test]
    async fn test_assemble_whitelist_preserves_registered_priority() {
        let registry = ContextRegistry::new();
        registry.register(
            Arc::new(StaticProvider {
                name: "low",
                contribution: ContextContribution::context("low-ctx"),
            }),
            5,
        );
        registry.register(
            Arc::new(StaticProvider {
                name: "high",
                contribution: ContextContribution::context("high-ctx"),
            }),
            50,
        );

        let opts = AssembleOptions::whitelist(vec!["high".to_string(), "low".to_string()]);
        let assembled = registry.assemble("alice", &message(), &opts).await;
        assert_eq!(assembled.context, "low-ctx\n\nhigh-ctx");
    }

    #[tokio::test]
    async fn test_assemble_failed_provider_adds_warning_not_abort() {
        let registry = ContextRegistry::new();
        registry.register(Arc::new(FailingProvider), 10);
        registry.register(
            Arc::new(StaticProvider {
                name: "ok",
                contribution: ContextContribution::system("fine"),
            }),
            20,
        );

        let assembled = registry.assemble("alice", &message(), &AssembleOptions::all()).await;
        assert_eq!(assembled.system, "fine");
        assert_eq!(assembled.warnings.len(), 1);
        assert!(assembled.warnings[0].contains("failing"));
    }

    #[test]
    fn test_list_sorted_by_priority_reflects_enabled_state() {
        let registry = ContextRegistry::new();
        registry.register(Arc::new(StaticProvider { name: "second", contribution: ContextContribution::empty() }), 20);
        registry.register(Arc::new(StaticProvider { name: "first", contribution: ContextContribution::empty() }), 10);
        registry.set_enabled("second", false);

        let info = registry.list();
        let names: Vec<_> = info.iter().map(|entry| entry.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second"]);
        assert!(!info.iter().find(|entry| entry.name == "second").unwrap().enabled);
    }

    #[test]
    fn test_set_priority_and_enabled_unknown_name() {
        let registry = ContextRegistry::new();
        assert!(!registry.set_enabled("ghost", false));
        assert!(!registry.set_priority("ghost", 1));
    }
}
