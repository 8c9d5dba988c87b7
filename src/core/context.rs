//! Service wiring
//!
//! Builds the registry, token store, FHIR client and record store once from
//! configuration and hands out the components that use them.

use super::connection::ConnectionTester;
use super::sync::SyncOrchestrator;
use crate::adapters::fhir::{FhirClient, ProviderRegistry, TokenStore};
use crate::adapters::persistence::{create_record_store, RecordStore};
use crate::config::FhirsyncConfig;
use crate::domain::Result;
use std::sync::Arc;

/// Shared services for one process
pub struct SyncContext {
    client: Arc<FhirClient>,
    store: Arc<dyn RecordStore>,
}

impl SyncContext {
    /// Builds every service from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a provider entry is invalid, the HTTP client
    /// cannot be built, or the record store cannot be opened
    pub async fn from_config(config: &FhirsyncConfig) -> Result<Self> {
        let store = create_record_store(config).await?;
        Self::with_store(config, store)
    }

    /// Builds the FHIR services around an existing record store
    ///
    /// # Errors
    ///
    /// Returns an error if a provider entry is invalid or the HTTP client
    /// cannot be built
    pub fn with_store(config: &FhirsyncConfig, store: Arc<dyn RecordStore>) -> Result<Self> {
        let tokens = Arc::new(TokenStore::new());
        let registry = Arc::new(ProviderRegistry::from_config(config, tokens)?);
        let client = Arc::new(FhirClient::new(registry, &config.http)?);

        tracing::debug!(
            providers = client.registry().len(),
            store = store.backend_name(),
            "Sync context initialized"
        );

        Ok(Self { client, store })
    }

    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        self.client.registry()
    }

    pub fn client(&self) -> &Arc<FhirClient> {
        &self.client
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    pub fn orchestrator(&self) -> SyncOrchestrator {
        SyncOrchestrator::new(Arc::clone(&self.client), Arc::clone(&self.store))
    }

    pub fn connection_tester(&self) -> ConnectionTester {
        ConnectionTester::new(Arc::clone(&self.client))
    }
}
