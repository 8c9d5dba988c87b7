//! Sync outcome reporting

use crate::domain::LocalId;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Outcome of syncing one patient
///
/// `success` reflects only the patient step: observation failures are
/// recorded in `errors` without clearing it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResult {
    /// Patient fetched and stored
    pub success: bool,

    /// 1 when the patient was stored, else 0
    pub patients_synced: usize,

    /// Observations stored
    pub observations_synced: usize,

    /// Human-readable error per failed step or item
    pub errors: Vec<String>,

    /// When the sync finished
    pub last_sync_time: DateTime<Utc>,

    /// Local id of the stored patient
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_patient_id: Option<LocalId>,
}

impl SyncResult {
    /// Create an empty, not yet successful result
    pub fn new() -> Self {
        Self {
            success: false,
            patients_synced: 0,
            observations_synced: 0,
            errors: Vec::new(),
            last_sync_time: Utc::now(),
            local_patient_id: None,
        }
    }

    /// Add an error
    pub fn add_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Stamp the completion time
    pub fn finish(mut self) -> Self {
        self.last_sync_time = Utc::now();
        self
    }
}

impl Default for SyncResult {
    fn default() -> Self {
        Self::new()
    }
}
