//! Record store factory
//!
//! Selects the [`RecordStore`] implementation from configuration.

use super::memory::InMemoryStore;
use super::postgres::PostgresStore;
use super::traits::RecordStore;
use crate::config::{FhirsyncConfig, PersistenceBackend};
use crate::domain::{FhirsyncError, Result};
use std::sync::Arc;

/// Creates the record store named by `[persistence]`
///
/// Dry runs always get an [`InMemoryStore`]. The PostgreSQL backend applies
/// the embedded schema migration before it is returned.
///
/// # Errors
///
/// Returns an error if the PostgreSQL pool cannot be created or the
/// migration fails
pub async fn create_record_store(config: &FhirsyncConfig) -> Result<Arc<dyn RecordStore>> {
    if config.application.dry_run {
        tracing::info!("Dry run: records are kept in memory only");
        return Ok(Arc::new(InMemoryStore::new()));
    }

    match config.persistence.backend {
        PersistenceBackend::Memory => {
            tracing::info!("Using in-memory record store");
            Ok(Arc::new(InMemoryStore::new()))
        }
        PersistenceBackend::PostgreSQL => {
            let pg_config = config.persistence.postgresql.as_ref().ok_or_else(|| {
                FhirsyncError::Configuration(
                    "persistence.postgresql configuration is required when backend = 'postgresql'"
                        .to_string(),
                )
            })?;

            tracing::info!("Creating PostgreSQL record store");
            let store = PostgresStore::new(pg_config)?;
            store.ensure_schema().await?;

            Ok(Arc::new(store))
        }
    }
}
