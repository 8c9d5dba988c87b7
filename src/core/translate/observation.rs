//! FHIR Observation → local observation record

use crate::adapters::fhir::models::{CodeableConcept, RemoteObservation};
use crate::domain::{ExternalRef, LocalId, LocalObservationRecord};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};

/// Translates a remote observation for an already-stored local patient
///
/// Never fails. The value is the quantity value rendered as text, else the
/// string value, else empty.
pub fn to_local_observation(
    remote: &RemoteObservation,
    patient_id: &LocalId,
) -> LocalObservationRecord {
    let coding = remote.code.as_ref().and_then(|code| code.coding.first());

    let observation_type = coding
        .and_then(|c| c.code.clone())
        .unwrap_or_default();
    let display = coding
        .and_then(|c| c.display.clone())
        .or_else(|| remote.code.as_ref().and_then(|code| code.text.clone()))
        .unwrap_or_default();

    let quantity = remote.value_quantity.as_ref();
    let value = match quantity.and_then(|q| q.value) {
        Some(number) => number.to_string(),
        None => remote.value_string.clone().unwrap_or_default(),
    };
    let unit = quantity
        .and_then(|q| q.unit.clone().or_else(|| q.code.clone()))
        .unwrap_or_default();

    LocalObservationRecord {
        patient_id: patient_id.clone(),
        observation_type,
        display,
        value,
        unit,
        observed_at: remote
            .effective_date_time
            .as_deref()
            .and_then(parse_effective_date_time),
        status: remote.status.clone().unwrap_or_default(),
        categories: category_codes(&remote.category),
        external_ref: ExternalRef::fhir(remote.id.clone()),
    }
}

/// Parses an RFC 3339 timestamp, or a plain date taken as midnight UTC
pub(crate) fn parse_effective_date_time(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Some(timestamp.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| Utc.from_utc_datetime(&midnight))
}

fn category_codes(categories: &[CodeableConcept]) -> Vec<String> {
    let mut codes: Vec<String> = Vec::new();

    for category in categories {
        let code = category
            .coding
            .iter()
            .find_map(|c| c.code.clone())
            .or_else(|| category.text.clone());

        if let Some(code) = code {
            if !codes.contains(&code) {
                codes.push(code);
            }
        }
    }

    codes
}
