//! Record store abstraction
//!
//! The sync orchestrator writes translated records through [`RecordStore`].
//! Upserts are idempotent: writing a record whose external reference already
//! exists updates it and returns the existing local id.

use crate::domain::{LocalId, LocalObservationRecord, LocalPatientRecord, Result};
use async_trait::async_trait;

/// Destination for synced patient and observation records
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Inserts or updates a patient keyed by tenant and external reference
    ///
    /// # Errors
    ///
    /// Returns a persistence error if the write fails
    async fn upsert_patient(&self, record: &LocalPatientRecord) -> Result<LocalId>;

    /// Inserts or updates an observation keyed by patient and external reference
    ///
    /// # Errors
    ///
    /// Returns a persistence error if the write fails
    async fn upsert_observation(&self, record: &LocalObservationRecord) -> Result<LocalId>;

    /// Human-readable backend name for logs
    fn backend_name(&self) -> &'static str;
}
