//! Local record shapes produced by the translator
//!
//! These are the structures handed to the record store. The store owns them
//! once written; fhirsync never reads them back except through the ids the
//! store returns.

use super::ids::{LocalId, TenantId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Marker stored on every record that originated from a FHIR server
pub const FHIR_SOURCE: &str = "FHIR";

/// Link between a local record and the remote resource it was built from
///
/// Upserts are keyed by this reference so that re-syncing the same remote
/// resource updates the existing record instead of duplicating it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalRef {
    /// Origin marker, always [`FHIR_SOURCE`] for synced records
    pub source: String,

    /// Remote resource id
    pub remote_id: String,
}

impl ExternalRef {
    /// Reference to a FHIR resource id
    pub fn fhir(remote_id: impl Into<String>) -> Self {
        Self {
            source: FHIR_SOURCE.to_string(),
            remote_id: remote_id.into(),
        }
    }
}

/// Postal address taken from the first FHIR address entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientAddress {
    pub line: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

impl PatientAddress {
    /// True when every component is empty
    pub fn is_empty(&self) -> bool {
        self.line.is_empty()
            && self.city.is_empty()
            && self.state.is_empty()
            && self.postal_code.is_empty()
            && self.country.is_empty()
    }
}

/// Patient record in the local platform shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalPatientRecord {
    /// Owning tenant (clinic)
    pub tenant_id: TenantId,

    /// Given name, empty when the remote resource has none
    pub first_name: String,

    /// Family name, empty when the remote resource has none
    pub last_name: String,

    /// Email address, empty when absent
    pub email: String,

    /// Phone number, empty when absent
    pub phone: String,

    /// Date of birth, unset when missing or unparseable
    pub date_of_birth: Option<NaiveDate>,

    /// Administrative gender, copied verbatim
    pub gender: Option<String>,

    /// Medical record number
    pub medical_record_number: Option<String>,

    /// Primary address
    pub address: Option<PatientAddress>,

    /// Remote resource reference used as the upsert key
    pub external_ref: ExternalRef,
}

/// Observation record in the local platform shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalObservationRecord {
    /// Local patient the observation belongs to
    pub patient_id: LocalId,

    /// Observation code (e.g. a LOINC code)
    pub observation_type: String,

    /// Human-readable name of the observation
    pub display: String,

    /// Value rendered as text
    pub value: String,

    /// Unit of measure, empty for non-quantity values
    pub unit: String,

    /// When the observation was made
    pub observed_at: Option<DateTime<Utc>>,

    /// FHIR status, copied verbatim
    pub status: String,

    /// Category codes (e.g. `laboratory`, `vital-signs`)
    pub categories: Vec<String>,

    /// Remote resource reference used as the upsert key
    pub external_ref: ExternalRef,
}
