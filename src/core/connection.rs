//! Provider connectivity checks

use crate::adapters::fhir::FhirClient;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

/// Outcome of a connection test
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionTestResult {
    pub success: bool,
    pub message: String,

    /// Duration of the metadata request; 0 when it was not attempted
    pub response_time_ms: u64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fhir_version: Option<String>,
}

impl ConnectionTestResult {
    fn failure(message: impl Into<String>, response_time_ms: u64) -> Self {
        Self {
            success: false,
            message: message.into(),
            response_time_ms,
            fhir_version: None,
        }
    }
}

/// Checks that a provider is reachable with valid credentials
///
/// Obtains a token, then times a `GET {base}/metadata`. The registry is
/// never modified.
pub struct ConnectionTester {
    client: Arc<FhirClient>,
}

impl ConnectionTester {
    pub fn new(client: Arc<FhirClient>) -> Self {
        Self { client }
    }

    pub async fn test_connection(&self, key: &str) -> ConnectionTestResult {
        let Some(provider) = self.client.registry().get(key) else {
            return ConnectionTestResult::failure(format!("Provider '{key}' is not configured"), 0);
        };

        if !provider.enabled {
            return ConnectionTestResult::failure(
                format!("{} ({}) is disabled", provider.display_name, provider.key),
                0,
            );
        }

        if let Err(e) = self.client.tokens().get_token(key).await {
            tracing::warn!(provider = %provider.key, error = %e, "Connection test: token request failed");
            return ConnectionTestResult::failure(e.to_string(), 0);
        }

        let started = Instant::now();
        let outcome = self.client.fetch_metadata(key).await;
        let response_time_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(metadata) => {
                let message = match metadata.fhir_version.as_deref() {
                    Some(version) => format!(
                        "Connected to {} (FHIR {version})",
                        provider.display_name
                    ),
                    None => format!("Connected to {}", provider.display_name),
                };

                tracing::info!(
                    provider = %provider.key,
                    response_time_ms = response_time_ms,
                    fhir_version = metadata.fhir_version.as_deref().unwrap_or("unknown"),
                    "Connection test succeeded"
                );

                ConnectionTestResult {
                    success: true,
                    message,
                    response_time_ms,
                    fhir_version: metadata.fhir_version,
                }
            }
            Err(e) => {
                tracing::warn!(provider = %provider.key, error = %e, "Connection test failed");
                ConnectionTestResult::failure(
                    format!("Connection to {} failed: {e}", provider.display_name),
                    response_time_ms,
                )
            }
        }
    }
}
