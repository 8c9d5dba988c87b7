//! OAuth2 client-credentials token cache
//!
//! Tokens live in a [`TokenStore`], a process-wide map keyed by provider key
//! and shared by `Arc` between the registry (which clears entries when a
//! provider is disabled) and the [`TokenCache`] (which fills them).

use super::registry::ProviderRegistry;
use crate::domain::{EmrError, EmrResult, Provider, ProviderKey};
use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Duration, Utc};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Lifetime assumed when the token endpoint omits `expires_in`
pub const DEFAULT_EXPIRES_IN_SECONDS: i64 = 3600;

/// Upper bound applied to the lifetime reported by a token endpoint
pub const MAX_EXPIRES_IN_SECONDS: i64 = 86_400;

/// Access token obtained for one provider
#[derive(Clone)]
pub struct CachedToken {
    pub provider_key: ProviderKey,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl CachedToken {
    /// A token is usable only while its expiry lies in the future
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

impl std::fmt::Debug for CachedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedToken")
            .field("provider_key", &self.provider_key)
            .field("token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Keyed token map, at most one entry per provider
#[derive(Debug, Default)]
pub struct TokenStore {
    entries: RwLock<HashMap<ProviderKey, CachedToken>>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored token for `key` if it is still valid at `now`
    pub fn get_valid(&self, key: &ProviderKey, now: DateTime<Utc>) -> Option<CachedToken> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(key)
            .filter(|token| token.is_valid_at(now))
            .cloned()
    }

    /// Stores a token, replacing any previous one for the same provider
    pub fn put(&self, token: CachedToken) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(token.provider_key.clone(), token);
    }

    /// Drops the token for `key`; returns whether one was present
    pub fn invalidate(&self, key: &ProviderKey) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key).is_some()
    }

    pub fn contains(&self, key: &ProviderKey) -> bool {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Token endpoint response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,

    #[serde(default, deserialize_with = "deserialize_expires_in")]
    expires_in: Option<i64>,
}

/// Some servers send `expires_in` as a string
fn deserialize_expires_in<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(i64),
        String(String),
    }

    match Option::<NumberOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrString::Number(n)) => Ok(Some(n)),
        Some(NumberOrString::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Resolves access tokens for providers, exchanging client credentials on a miss
pub struct TokenCache {
    registry: Arc<ProviderRegistry>,
    client: Client,
}

impl TokenCache {
    pub fn new(registry: Arc<ProviderRegistry>, client: Client) -> Self {
        Self { registry, client }
    }

    /// Returns a valid access token for the provider
    ///
    /// Serves the cached token while it has not expired. Otherwise performs a
    /// client-credentials exchange and caches the result. Unknown or disabled
    /// providers fail before any network call.
    ///
    /// # Errors
    ///
    /// `ProviderNotFound`, `ProviderDisabled`, or `AuthFailure` when the
    /// exchange fails for any reason.
    pub async fn get_token(&self, key: &str) -> EmrResult<String> {
        let provider = self.registry.resolve(key)?;

        if let Some(cached) = self.registry.tokens().get_valid(&provider.key, Utc::now()) {
            tracing::trace!(provider = %provider.key, "Using cached access token");
            return Ok(cached.token);
        }

        let token = self.exchange(&provider).await?;
        let access_token = token.token.clone();
        self.registry.tokens().put(token);
        Ok(access_token)
    }

    /// Forgets the cached token for a provider
    pub fn invalidate(&self, key: &str) {
        if let Ok(key) = ProviderKey::new(key) {
            if self.registry.tokens().invalidate(&key) {
                tracing::debug!(provider = %key, "Invalidated cached access token");
            }
        }
    }

    async fn exchange(&self, provider: &Provider) -> EmrResult<CachedToken> {
        let token_url = provider.token_url();
        tracing::debug!(provider = %provider.key, url = %token_url, "Requesting access token");

        let credentials = format!(
            "{}:{}",
            provider.client_id,
            provider.client_secret.expose_secret().as_ref()
        );
        let encoded = general_purpose::STANDARD.encode(credentials.as_bytes());
        let scope = provider.scope_param();

        let resp = self
            .client
            .post(&token_url)
            .header(AUTHORIZATION, format!("Basic {encoded}"))
            .header(ACCEPT, "application/json")
            .form(&[("grant_type", "client_credentials"), ("scope", scope.as_str())])
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(provider = %provider.key, error = %e, "Token request failed");
                EmrError::AuthFailure(format!(
                    "Token request to {} failed: {e}",
                    provider.display_name
                ))
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(
                provider = %provider.key,
                status = status.as_u16(),
                "Token endpoint rejected client credentials"
            );
            return Err(EmrError::AuthFailure(format!(
                "{} token endpoint returned {status}: {}",
                provider.display_name,
                truncate(&body, 200)
            )));
        }

        let body: TokenResponse = resp.json().await.map_err(|e| {
            EmrError::AuthFailure(format!(
                "{} token response could not be parsed: {e}",
                provider.display_name
            ))
        })?;

        if body.access_token.trim().is_empty() {
            return Err(EmrError::AuthFailure(format!(
                "{} token response contained an empty access_token",
                provider.display_name
            )));
        }

        let expires_in = body.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECONDS);
        let expires_at = expiry_from(Utc::now(), expires_in);

        tracing::info!(
            provider = %provider.key,
            expires_in = expires_in,
            "Obtained access token"
        );

        Ok(CachedToken {
            provider_key: provider.key.clone(),
            token: body.access_token,
            expires_at,
        })
    }
}

/// Expiry for a reported lifetime, clamped to `0..=MAX_EXPIRES_IN_SECONDS`
///
/// A negative lifetime yields an already expired token.
pub(crate) fn expiry_from(now: DateTime<Utc>, expires_in: i64) -> DateTime<Utc> {
    let seconds = expires_in.clamp(0, MAX_EXPIRES_IN_SECONDS);
    Duration::try_seconds(seconds)
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .unwrap_or(now)
}

/// Shortens a response body for inclusion in an error message
pub(crate) fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let mut short: String = text.chars().take(max_chars).collect();
        short.push_str("...");
        short
    }
}
