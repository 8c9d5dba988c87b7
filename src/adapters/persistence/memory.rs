//! In-memory record store
//!
//! Used for dry runs and tests. Nothing outlives the process.

use super::traits::RecordStore;
use crate::domain::{
    ExternalRef, LocalId, LocalObservationRecord, LocalPatientRecord, Result, TenantId,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

#[derive(Default)]
struct Tables {
    patients: HashMap<(TenantId, ExternalRef), (LocalId, LocalPatientRecord)>,
    observations: HashMap<(LocalId, ExternalRef), (LocalId, LocalObservationRecord)>,
}

/// Process-local [`RecordStore`]
#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn patient_count(&self) -> usize {
        self.lock().patients.len()
    }

    pub fn observation_count(&self) -> usize {
        self.lock().observations.len()
    }

    /// Looks up a stored patient by tenant and remote id
    pub fn find_patient(
        &self,
        tenant_id: &TenantId,
        remote_id: &str,
    ) -> Option<(LocalId, LocalPatientRecord)> {
        let key = (tenant_id.clone(), ExternalRef::fhir(remote_id));
        self.lock().patients.get(&key).cloned()
    }

    /// All observations stored for a local patient
    pub fn observations_for(&self, patient_id: &LocalId) -> Vec<LocalObservationRecord> {
        self.lock()
            .observations
            .iter()
            .filter(|((owner, _), _)| owner == patient_id)
            .map(|(_, (_, record))| record.clone())
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn upsert_patient(&self, record: &LocalPatientRecord) -> Result<LocalId> {
        let key = (record.tenant_id.clone(), record.external_ref.clone());
        let mut tables = self.lock();

        let id = match tables.patients.get(&key) {
            Some((id, _)) => id.clone(),
            None => LocalId::generate(),
        };
        tables.patients.insert(key, (id.clone(), record.clone()));

        Ok(id)
    }

    async fn upsert_observation(&self, record: &LocalObservationRecord) -> Result<LocalId> {
        let key = (record.patient_id.clone(), record.external_ref.clone());
        let mut tables = self.lock();

        let id = match tables.observations.get(&key) {
            Some((id, _)) => id.clone(),
            None => LocalId::generate(),
        };
        tables.observations.insert(key, (id.clone(), record.clone()));

        Ok(id)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
