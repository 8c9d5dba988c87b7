//! Provider registry
//!
//! Holds every configured EMR provider for the process lifetime. Only the
//! `enabled` flag changes after startup; it is an atomic so toggling needs no
//! lock. Disabling a provider clears its cached token.

use super::token::TokenStore;
use crate::config::FhirsyncConfig;
use crate::domain::{EmrError, EmrResult, FhirsyncError, Provider, ProviderKey, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

struct RegisteredProvider {
    provider: Provider,
    enabled: AtomicBool,
}

/// Registry of configured EMR providers
pub struct ProviderRegistry {
    providers: BTreeMap<ProviderKey, RegisteredProvider>,
    tokens: Arc<TokenStore>,
}

impl ProviderRegistry {
    /// Builds a registry from provider definitions
    ///
    /// # Errors
    ///
    /// Returns a configuration error if two providers share a key
    pub fn new(providers: Vec<Provider>, tokens: Arc<TokenStore>) -> Result<Self> {
        let mut map = BTreeMap::new();

        for provider in providers {
            let key = provider.key.clone();
            let enabled = AtomicBool::new(provider.enabled);
            if map
                .insert(key.clone(), RegisteredProvider { provider, enabled })
                .is_some()
            {
                return Err(FhirsyncError::Configuration(format!(
                    "Duplicate provider key: {key}"
                )));
            }
        }

        tracing::debug!(providers = map.len(), "Provider registry initialized");

        Ok(Self {
            providers: map,
            tokens,
        })
    }

    /// Builds the registry from the `[providers.*]` configuration sections
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a provider entry cannot be materialized
    pub fn from_config(config: &FhirsyncConfig, tokens: Arc<TokenStore>) -> Result<Self> {
        let providers = config
            .build_providers()
            .map_err(FhirsyncError::Configuration)?;
        Self::new(providers, tokens)
    }

    /// Snapshot of a provider, `None` when no provider uses this key
    ///
    /// The snapshot's `enabled` field reflects the current flag.
    pub fn get(&self, key: &str) -> Option<Provider> {
        let key = ProviderKey::new(key).ok()?;
        self.providers.get(&key).map(|entry| {
            let mut provider = entry.provider.clone();
            provider.enabled = entry.enabled.load(Ordering::SeqCst);
            provider
        })
    }

    /// Returns the provider if it exists and is enabled
    ///
    /// # Errors
    ///
    /// `ProviderNotFound` for an unknown key, `ProviderDisabled` for a
    /// disabled provider.
    pub fn resolve(&self, key: &str) -> EmrResult<Provider> {
        let provider = self
            .get(key)
            .ok_or_else(|| EmrError::ProviderNotFound(key.to_string()))?;

        if !provider.enabled {
            return Err(EmrError::ProviderDisabled(provider.key.to_string()));
        }

        Ok(provider)
    }

    pub fn list_configured(&self) -> BTreeSet<ProviderKey> {
        self.providers.keys().cloned().collect()
    }

    pub fn list_enabled(&self) -> BTreeSet<ProviderKey> {
        self.providers
            .iter()
            .filter(|(_, entry)| entry.enabled.load(Ordering::SeqCst))
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Enables or disables a provider at runtime
    ///
    /// Disabling also drops the provider's cached token.
    ///
    /// # Errors
    ///
    /// `ProviderNotFound` if no provider uses this key
    pub fn set_enabled(&self, key: &str, enabled: bool) -> EmrResult<()> {
        let not_found = || EmrError::ProviderNotFound(key.to_string());
        let provider_key = ProviderKey::new(key).map_err(|_| not_found())?;
        let entry = self.providers.get(&provider_key).ok_or_else(not_found)?;

        let previous = entry.enabled.swap(enabled, Ordering::SeqCst);
        if !enabled {
            self.tokens.invalidate(&provider_key);
        }

        if previous != enabled {
            tracing::info!(provider = %provider_key, enabled = enabled, "Provider toggled");
        }

        Ok(())
    }

    /// Shared token store
    pub fn tokens(&self) -> &Arc<TokenStore> {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::fhir::token::CachedToken;
    use crate::config::secret_string;
    use crate::domain::Vendor;
    use chrono::{Duration, Utc};

    fn provider(key: &str, enabled: bool) -> Provider {
        Provider {
            key: ProviderKey::new(key).unwrap(),
            vendor: Vendor::infer(key),
            display_name: key.to_string(),
            base_url: format!("https://{key}.example/fhir"),
            client_id: "client".to_string(),
            client_secret: secret_string("secret".to_string()),
            scopes: vec!["system/*.read".to_string()],
            enabled,
        }
    }

    fn registry() -> ProviderRegistry {
        ProviderRegistry::new(
            vec![provider("epic", true), provider("cerner", false)],
            Arc::new(TokenStore::new()),
        )
        .unwrap()
    }

    #[test]
    fn test_get_unknown_is_none() {
        let registry = registry();
        assert!(registry.get("athena").is_none());
        assert!(registry.get("").is_none());
    }

    #[test]
    fn test_get_normalizes_key() {
        let registry = registry();
        assert_eq!(registry.get("EPIC").unwrap().key.as_str(), "epic");
    }

    #[test]
    fn test_list_configured_and_enabled() {
        let registry = registry();
        let configured: Vec<_> = registry
            .list_configured()
            .into_iter()
            .map(|k| k.to_string())
            .collect();
        assert_eq!(configured, vec!["cerner", "epic"]);

        let enabled: Vec<_> = registry
            .list_enabled()
            .into_iter()
            .map(|k| k.to_string())
            .collect();
        assert_eq!(enabled, vec!["epic"]);
    }

    #[test]
    fn test_resolve_outcomes() {
        let registry = registry();
        assert!(registry.resolve("epic").is_ok());
        assert_eq!(
            registry.resolve("cerner").unwrap_err(),
            EmrError::ProviderDisabled("cerner".to_string())
        );
        assert_eq!(
            registry.resolve("athena").unwrap_err(),
            EmrError::ProviderNotFound("athena".to_string())
        );
    }

    #[test]
    fn test_set_enabled_unknown_provider() {
        let registry = registry();
        assert!(matches!(
            registry.set_enabled("athena", true),
            Err(EmrError::ProviderNotFound(_))
        ));
    }

    #[test]
    fn test_disable_clears_cached_token() {
        let registry = registry();
        let key = ProviderKey::new("epic").unwrap();
        registry.tokens().put(CachedToken {
            provider_key: key.clone(),
            token: "abc".to_string(),
            expires_at: Utc::now() + Duration::hours(1),
        });

        registry.set_enabled("epic", false).unwrap();

        assert!(!registry.tokens().contains(&key));
        assert!(!registry.get("epic").unwrap().enabled);
        assert!(registry.list_enabled().is_empty());
    }

    #[test]
    fn test_enable_keeps_other_tokens() {
        let registry = registry();
        registry.set_enabled("cerner", true).unwrap();
        assert!(registry.get("cerner").unwrap().enabled);
        assert_eq!(registry.list_enabled().len(), 2);
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let result = ProviderRegistry::new(
            vec![provider("epic", true), provider("EPIC", true)],
            Arc::new(TokenStore::new()),
        );
        assert!(result.is_err());
    }
}
