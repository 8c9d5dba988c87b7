//! FHIR R4 REST client
//!
//! Every call resolves the provider, obtains a bearer token from the
//! [`TokenCache`] and maps HTTP outcomes onto [`EmrError`]. A 401 response
//! invalidates the token and the call is retried exactly once with a fresh
//! token.

use super::models::{Bundle, RemoteObservation, RemotePatient, ServerMetadata};
use super::registry::ProviderRegistry;
use super::token::{truncate, TokenCache};
use crate::config::HttpConfig;
use crate::domain::{EmrError, EmrResult, FhirsyncError, Provider, Result};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, ClientBuilder, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Media type requested from FHIR servers
pub const FHIR_JSON: &str = "application/fhir+json";

/// Builds the shared HTTP client from `[http]` settings
///
/// # Errors
///
/// Returns a configuration error if the TLS backend cannot be initialized
pub fn build_http_client(config: &HttpConfig) -> Result<Client> {
    let mut builder = ClientBuilder::new()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
        .user_agent(concat!("fhirsync/", env!("CARGO_PKG_VERSION")));

    if !config.tls_verify {
        tracing::warn!("TLS certificate verification is disabled for EMR connections");
        builder = builder.danger_accept_invalid_certs(true);
    }

    builder
        .build()
        .map_err(|e| FhirsyncError::Configuration(format!("Failed to build HTTP client: {e}")))
}

/// Client for reading patients, observations and server metadata
///
/// # Example
///
/// ```no_run
/// use fhirsync::adapters::fhir::{FhirClient, ProviderRegistry, TokenStore};
/// use fhirsync::config::FhirsyncConfig;
/// use std::sync::Arc;
///
/// # async fn example() -> fhirsync::domain::Result<()> {
/// let config = FhirsyncConfig::default();
/// let registry = Arc::new(ProviderRegistry::from_config(&config, Arc::new(TokenStore::new()))?);
/// let client = FhirClient::new(registry, &config.http)?;
///
/// let patient = client.fetch_patient("epic", "e63wRTbPfr1p8UW81d8Seiw3").await?;
/// println!("{:?}", patient.name);
/// # Ok(())
/// # }
/// ```
pub struct FhirClient {
    registry: Arc<ProviderRegistry>,
    tokens: TokenCache,
    client: Client,
    max_pages: usize,
}

impl FhirClient {
    /// Creates a client with its own HTTP connection pool
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built
    pub fn new(registry: Arc<ProviderRegistry>, config: &HttpConfig) -> Result<Self> {
        let client = build_http_client(config)?;
        Ok(Self::with_http_client(registry, client, config.max_pages))
    }

    /// Creates a client around an existing `reqwest::Client`
    pub fn with_http_client(
        registry: Arc<ProviderRegistry>,
        client: Client,
        max_pages: usize,
    ) -> Self {
        let tokens = TokenCache::new(Arc::clone(&registry), client.clone());
        Self {
            registry,
            tokens,
            client,
            max_pages: max_pages.max(1),
        }
    }

    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    pub fn tokens(&self) -> &TokenCache {
        &self.tokens
    }

    /// `GET {base}/Patient/{id}`
    ///
    /// # Errors
    ///
    /// `NotFound` on 404, `AuthFailure` if the token is rejected twice,
    /// `Transport` for other failures, `InvalidResponse` for an undecodable body.
    pub async fn fetch_patient(&self, key: &str, patient_id: &str) -> EmrResult<RemotePatient> {
        let provider = self.registry.resolve(key)?;
        let patient_id = validate_resource_id(patient_id)?;
        let resource = format!("Patient/{patient_id}");
        let url = provider.fhir_url(&resource);

        tracing::debug!(provider = %provider.key, patient_id = %patient_id, "Fetching patient");

        let body = self.get_json(&provider, &url, &resource).await?;
        expect_resource_type(&body, "Patient")?;

        serde_json::from_value(body)
            .map_err(|e| EmrError::InvalidResponse(format!("Patient could not be decoded: {e}")))
    }

    /// `GET {base}/Observation?patient={id}`, following `next` links
    ///
    /// Entries that are not Observations are skipped. A failed page or an
    /// undecodable Observation fails the whole call.
    ///
    /// # Errors
    ///
    /// Same mapping as [`fetch_patient`](Self::fetch_patient); `InvalidResponse`
    /// also when the page limit is exceeded or a `next` link leaves the provider.
    pub async fn fetch_observations(
        &self,
        key: &str,
        patient_id: &str,
    ) -> EmrResult<Vec<RemoteObservation>> {
        let provider = self.registry.resolve(key)?;
        let patient_id = validate_resource_id(patient_id)?;
        let base = Url::parse(&provider.fhir_url("Observation")).map_err(|e| {
            EmrError::network(format!("Invalid base URL for {}: {e}", provider.key))
        })?;

        let mut first_page = base.clone();
        first_page
            .query_pairs_mut()
            .append_pair("patient", patient_id);

        let mut observations = Vec::new();
        let mut next_page = Some(first_page);
        let mut pages = 0usize;

        while let Some(page_url) = next_page.take() {
            if pages == self.max_pages {
                return Err(EmrError::InvalidResponse(format!(
                    "Observation search exceeded {} pages",
                    self.max_pages
                )));
            }
            pages += 1;

            let body = self
                .get_json(&provider, page_url.as_str(), "Observation search")
                .await?;
            expect_resource_type(&body, "Bundle")?;

            let bundle: Bundle = serde_json::from_value(body).map_err(|e| {
                EmrError::InvalidResponse(format!("Observation bundle could not be decoded: {e}"))
            })?;

            for entry in &bundle.entry {
                let Some(resource) = entry.resource.as_ref() else {
                    continue;
                };

                match resource.get("resourceType").and_then(Value::as_str) {
                    Some("Observation") => {
                        let observation: RemoteObservation =
                            serde_json::from_value(resource.clone()).map_err(|e| {
                                EmrError::InvalidResponse(format!(
                                    "Observation could not be decoded: {e}"
                                ))
                            })?;
                        observations.push(observation);
                    }
                    other => {
                        tracing::debug!(
                            provider = %provider.key,
                            resource_type = other.unwrap_or("unknown"),
                            "Skipping non-Observation bundle entry"
                        );
                    }
                }
            }

            if let Some(link) = bundle.next_link() {
                next_page = Some(resolve_next_link(&base, &page_url, link)?);
            }
        }

        tracing::debug!(
            provider = %provider.key,
            patient_id = %patient_id,
            observations = observations.len(),
            pages = pages,
            "Fetched observations"
        );

        Ok(observations)
    }

    /// `GET {base}/metadata`
    pub async fn fetch_metadata(&self, key: &str) -> EmrResult<ServerMetadata> {
        let provider = self.registry.resolve(key)?;
        let url = provider.fhir_url("metadata");

        let body = self.get_json(&provider, &url, "CapabilityStatement").await?;
        expect_resource_type(&body, "CapabilityStatement")?;

        Ok(ServerMetadata::from_capability_statement(&body))
    }

    /// Authenticated GET with the single refresh-and-retry on 401
    async fn get_json(&self, provider: &Provider, url: &str, what: &str) -> EmrResult<Value> {
        let key = provider.key.as_str();
        let token = self.tokens.get_token(key).await?;

        match self.send_get(url, &token, what).await {
            Err(EmrError::AuthFailure(reason)) => {
                tracing::warn!(
                    provider = %provider.key,
                    reason = %reason,
                    "Access token rejected, refreshing and retrying once"
                );
                self.tokens.invalidate(key);
                let token = self.tokens.get_token(key).await?;
                self.send_get(url, &token, what).await
            }
            outcome => outcome,
        }
    }

    async fn send_get(&self, url: &str, token: &str, what: &str) -> EmrResult<Value> {
        let resp = self
            .client
            .get(url)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .header(ACCEPT, FHIR_JSON)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    EmrError::network(format!("{what} request timed out: {e}"))
                } else {
                    EmrError::network(format!("{what} request failed: {e}"))
                }
            })?;

        match resp.status() {
            status if status.is_success() => resp.json::<Value>().await.map_err(|e| {
                EmrError::InvalidResponse(format!("{what} response is not valid JSON: {e}"))
            }),
            StatusCode::UNAUTHORIZED => Err(EmrError::AuthFailure(format!(
                "{what} request was rejected with HTTP 401"
            ))),
            StatusCode::NOT_FOUND => Err(EmrError::NotFound(what.to_string())),
            status => {
                let body = resp.text().await.unwrap_or_default();
                Err(EmrError::status(
                    status.as_u16(),
                    format!("{what} request failed: {}", truncate(&body, 200)),
                ))
            }
        }
    }
}

/// Longest id allowed by the FHIR `id` datatype
const MAX_RESOURCE_ID_LEN: usize = 64;

/// Trims and checks an id against the FHIR `id` datatype (`[A-Za-z0-9\-\.]{1,64}`)
fn validate_resource_id(id: &str) -> EmrResult<&str> {
    let id = id.trim();
    let valid = !id.is_empty()
        && id.len() <= MAX_RESOURCE_ID_LEN
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.');

    if valid {
        Ok(id)
    } else {
        Err(EmrError::InvalidId(id.to_string()))
    }
}

fn expect_resource_type(body: &Value, expected: &str) -> EmrResult<()> {
    match body.get("resourceType").and_then(Value::as_str) {
        Some(actual) if actual == expected => Ok(()),
        None => Ok(()),
        Some(actual) => Err(EmrError::InvalidResponse(format!(
            "Expected {expected} but server returned {actual}"
        ))),
    }
}

/// Resolves a Bundle `next` link and keeps it on the provider's host
fn resolve_next_link(base: &Url, current: &Url, link: &str) -> EmrResult<Url> {
    let next = current
        .join(link)
        .map_err(|e| EmrError::InvalidResponse(format!("Invalid next link '{link}': {e}")))?;

    if next.origin() != base.origin() {
        return Err(EmrError::InvalidResponse(format!(
            "Next link points outside the provider: {}",
            next.origin().ascii_serialization()
        )));
    }

    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_expect_resource_type() {
        assert!(expect_resource_type(&json!({"resourceType": "Patient"}), "Patient").is_ok());
        assert!(expect_resource_type(&json!({"id": "1"}), "Patient").is_ok());

        let err =
            expect_resource_type(&json!({"resourceType": "OperationOutcome"}), "Patient").unwrap_err();
        assert!(matches!(err, EmrError::InvalidResponse(_)));
    }

    #[test]
    fn test_validate_resource_id() {
        assert_eq!(
            validate_resource_id(" e63wRTbPfr1p8UW81d8Seiw3 ").unwrap(),
            "e63wRTbPfr1p8UW81d8Seiw3"
        );
        assert_eq!(validate_resource_id("12724066").unwrap(), "12724066");
        assert_eq!(validate_resource_id("a-b.c").unwrap(), "a-b.c");

        for bad in ["", "   ", "p1/_history/2", "p1?_format=xml", "p1#frag", "../metadata", "p 1"] {
            assert_eq!(
                validate_resource_id(bad).unwrap_err(),
                EmrError::InvalidId(bad.trim().to_string())
            );
        }
        assert!(validate_resource_id(&"a".repeat(65)).is_err());
        assert!(validate_resource_id(&"a".repeat(64)).is_ok());
    }

    #[test]
    fn test_resolve_next_link_absolute_and_relative() {
        let base = Url::parse("https://fhir.example/r4/Observation").unwrap();
        let current = Url::parse("https://fhir.example/r4/Observation?patient=1").unwrap();

        let next =
            resolve_next_link(&base, &current, "https://fhir.example/r4/Observation?page=2").unwrap();
        assert_eq!(next.as_str(), "https://fhir.example/r4/Observation?page=2");

        let next = resolve_next_link(&base, &current, "Observation?page=3").unwrap();
        assert_eq!(next.as_str(), "https://fhir.example/r4/Observation?page=3");
    }

    #[test]
    fn test_resolve_next_link_rejects_foreign_host() {
        let base = Url::parse("https://fhir.example/r4/Observation").unwrap();
        let current = base.clone();
        let err = resolve_next_link(&base, &current, "https://evil.example/steal").unwrap_err();
        assert!(matches!(err, EmrError::InvalidResponse(_)));
    }

    #[test]
    fn test_build_http_client() {
        assert!(build_http_client(&HttpConfig::default()).is_ok());
    }
}
