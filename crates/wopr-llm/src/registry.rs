//! Provider registry and resolver (§4.7).
//!
//! Providers are registered once at startup, keyed by name. Resolution
//! walks a requested name plus its fallback chain and returns the first
//! one currently marked `available`. Availability is a hint updated by
//! periodic health checks, not a correctness boundary: a provider that
//! looked available and then fails mid-stream is handled by the caller
//! re-resolving with that name excluded, not by the registry itself.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use crate::error::{LlmError, LlmResult};
use crate::provider::LlmProvider;

struct RegisteredProvider {
    provider: Arc<dyn LlmProvider>,
    available: AtomicBool,
}

/// Holds every registered provider and their live availability flags.
pub struct ProviderRegistry {
    providers: RwLock<HashMap<String, RegisteredProvider>>,
    credentials: RwLock<HashMap<String, String>>,
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry").finish_non_exhaustive()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// What to resolve: a preferred provider name plus an ordered fallback
/// chain tried if the preferred one is unavailable.
#[derive(Debug, Clone)]
pub struct ResolveConfig {
    /// The preferred provider name.
    pub name: String,
    /// Additional provider names tried, in order, if `name` is unavailable.
    pub fallback: Vec<String>,
}

impl ResolveConfig {
    /// Resolve a single provider name with no fallback chain.
    #[must_use]
    pub fn single(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fallback: Vec::new(),
        }
    }
}

/// A provider chosen by [`ProviderRegistry::resolve_provider`].
#[derive(Clone)]
pub struct ResolvedProvider {
    /// The name under which this provider was registered.
    pub name: String,
    /// The resolved provider handle.
    pub provider: Arc<dyn LlmProvider>,
}

impl std::fmt::Debug for ResolvedProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedProvider").field("name", &self.name).finish()
    }
}

impl ProviderRegistry {
    /// Construct an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            providers: RwLock::new(HashMap::new()),
            credentials: RwLock::new(HashMap::new()),
        }
    }

    /// Register (or replace) a provider under `name`, initially available.
    pub fn register(&self, name: impl Into<String>, provider: Arc<dyn LlmProvider>) {
        let name = name.into();
        self.providers.write().expect("provider registry lock poisoned").insert(
            name,
            RegisteredProvider {
                provider,
                available: AtomicBool::new(true),
            },
        );
    }

    /// `listProviders()`: every registered provider name.
    #[must_use]
    pub fn list_providers(&self) -> Vec<String> {
        let providers = self.providers.read().expect("provider registry lock poisoned");
        let mut names: Vec<String> = providers.keys().cloned().collect();
        names.sort();
        names
    }

    /// Load a credential for `provider_id` into the isolated credential
    /// store, keyed separately from the provider registry itself.
    pub fn load_credential(&self, provider_id: impl Into<String>, credential: impl Into<String>) {
        self.credentials
            .write()
            .expect("credential store lock poisoned")
            .insert(provider_id.into(), credential.into());
    }

    /// Fetch a previously loaded credential, if any.
    #[must_use]
    pub fn credential(&self, provider_id: &str) -> Option<String> {
        self.credentials
            .read()
            .expect("credential store lock poisoned")
            .get(provider_id)
            .cloned()
    }

    /// `resolveProvider(config) -> ResolvedProvider`.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::NoProviderAvailable`] if `config.name` and
    /// every entry in `config.fallback` is either unregistered or
    /// currently marked unavailable.
    pub fn resolve_provider(&self, config: &ResolveConfig) -> LlmResult<ResolvedProvider> {
        self.resolve_provider_excluding(config, &[])
    }

    /// As [`Self::resolve_provider`], but skips any name in `exclude`.
    ///
    /// This is the hook the injection executor uses to move to the next
    /// provider in the chain after one that was marked available fails
    /// mid-injection, without re-running a full health sweep.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::NoProviderAvailable`] under the same
    /// conditions as [`Self::resolve_provider`], additionally treating
    /// excluded names as unavailable.
    pub fn resolve_provider_excluding(
        &self,
        config: &ResolveConfig,
        exclude: &[String],
    ) -> LlmResult<ResolvedProvider> {
        let providers = self.providers.read().expect("provider registry lock poisoned");
        let chain = std::iter::once(&config.name).chain(config.fallback.iter());

        for name in chain {
            if exclude.iter().any(|excluded| excluded == name) {
                continue;
            }
            if let Some(entry) = providers.get(name)
                && entry.available.load(Ordering::Relaxed)
            {
                return Ok(ResolvedProvider {
                    name: name.clone(),
                    provider: Arc::clone(&entry.provider),
                });
            }
        }

        Err(LlmError::NoProviderAvailable {
            requested: config.name.clone(),
        })
    }

    /// `checkHealth()`: probe every registered provider and update its
    /// `available` flag. Health is a hint; callers must still cope with
    /// a provider marked available failing mid-injection.
    pub async fn check_health(&self) {
        let snapshot: Vec<(String, Arc<dyn LlmProvider>)> = {
            let providers = self.providers.read().expect("provider registry lock poisoned");
            providers
                .iter()
                .map(|(name, entry)| (name.clone(), Arc::clone(&entry.provider)))
                .collect()
        };

        for (name, provider) in snapshot {
            let healthy = provider.health_check().await;
            if let Some(entry) = self
                .providers
                .read()
                .expect("provider registry lock poisoned")
                .get(&name)
            {
                entry.available.store(healthy, Ordering::Relaxed);
            }
        }
    }

    /// Force a provider's availability flag, bypassing `checkHealth`.
    /// Used by the executor to mark a provider unavailable the instant
    /// it fails mid-injection, ahead of the next health sweep.
    pub fn set_available(&self, name: &str, available: bool) {
        if let Some(entry) = self.providers.read().expect("provider registry lock poisoned").get(name) {
            entry.available.store(available, Ordering::Relaxed);
        }
    }
}
