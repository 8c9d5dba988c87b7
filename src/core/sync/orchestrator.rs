//! Patient sync orchestration
//!
//! Pulls one patient and its observations from an EMR provider and writes
//! them to the record store. Steps run sequentially:
//!
//! 1. Fetch the patient; on failure stop with `success = false`
//! 2. Translate and upsert the patient; on failure stop with `success = false`
//! 3. Fetch observations; a failure is recorded but the sync still succeeds
//! 4. Translate and upsert each observation; item failures are recorded and
//!    processing continues
//!
//! Records are keyed by the remote resource id. A patient without one takes
//! the requested id; an observation without one is skipped as an error.

use super::result::SyncResult;
use crate::adapters::fhir::FhirClient;
use crate::adapters::persistence::RecordStore;
use crate::core::translate::{to_local_observation, to_local_patient};
use crate::domain::TenantId;
use std::sync::Arc;
use std::time::Instant;

/// Coordinates FHIR reads, translation and record store writes
pub struct SyncOrchestrator {
    client: Arc<FhirClient>,
    store: Arc<dyn RecordStore>,
}

impl SyncOrchestrator {
    pub fn new(client: Arc<FhirClient>, store: Arc<dyn RecordStore>) -> Self {
        Self { client, store }
    }

    /// Syncs one remote patient and its observations into `tenant_id`
    ///
    /// Never returns an error; every failure is described in the result.
    pub async fn sync_patient(
        &self,
        tenant_id: &TenantId,
        remote_patient_id: &str,
        provider_key: &str,
    ) -> SyncResult {
        let started = Instant::now();
        let mut result = SyncResult::new();

        crate::log_sync_start!(tenant_id, provider_key, remote_patient_id);

        let mut remote_patient = match self
            .client
            .fetch_patient(provider_key, remote_patient_id)
            .await
        {
            Ok(patient) => patient,
            Err(e) => {
                tracing::error!(
                    provider = provider_key,
                    patient_id = remote_patient_id,
                    error = %e,
                    "Failed to fetch patient"
                );
                result.add_error(format!("Failed to fetch patient {remote_patient_id}: {e}"));
                return self.finish(result, started);
            }
        };

        if remote_patient.id.trim().is_empty() {
            tracing::debug!(
                patient_id = remote_patient_id,
                "Patient resource has no id, using the requested id"
            );
            remote_patient.id = remote_patient_id.trim().to_string();
        }

        let local_patient = to_local_patient(&remote_patient, tenant_id);
        let patient_id = match self.store.upsert_patient(&local_patient).await {
            Ok(id) => id,
            Err(e) => {
                tracing::error!(
                    patient_id = remote_patient_id,
                    error = %e,
                    "Failed to store patient"
                );
                result.add_error(format!("Failed to store patient {remote_patient_id}: {e}"));
                return self.finish(result, started);
            }
        };

        result.success = true;
        result.patients_synced = 1;
        result.local_patient_id = Some(patient_id.clone());

        let observations = match self
            .client
            .fetch_observations(provider_key, remote_patient_id)
            .await
        {
            Ok(observations) => observations,
            Err(e) => {
                tracing::warn!(
                    provider = provider_key,
                    patient_id = remote_patient_id,
                    error = %e,
                    "Failed to fetch observations"
                );
                result.add_error(format!(
                    "Failed to fetch observations for patient {remote_patient_id}: {e}"
                ));
                return self.finish(result, started);
            }
        };

        for observation in &observations {
            if observation.id.trim().is_empty() {
                tracing::warn!(
                    patient_id = remote_patient_id,
                    "Skipping observation without an id"
                );
                result.add_error(format!(
                    "Skipped observation without an id for patient {remote_patient_id}"
                ));
                continue;
            }

            let record = to_local_observation(observation, &patient_id);
            match self.store.upsert_observation(&record).await {
                Ok(_) => result.observations_synced += 1,
                Err(e) => {
                    tracing::warn!(
                        observation_id = %observation.id,
                        error = %e,
                        "Failed to store observation"
                    );
                    result.add_error(format!(
                        "Failed to store observation {}: {e}",
                        observation.id
                    ));
                }
            }
        }

        self.finish(result, started)
    }

    fn finish(&self, result: SyncResult, started: Instant) -> SyncResult {
        let result = result.finish();
        crate::log_sync_complete!(result, started.elapsed());
        result
    }
}
