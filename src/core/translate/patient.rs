//! FHIR Patient → local patient record

use crate::adapters::fhir::models::{Address, ContactPoint, Identifier, RemotePatient};
use crate::domain::{ExternalRef, LocalPatientRecord, PatientAddress, TenantId};
use chrono::NaiveDate;

/// Identifier type code for a medical record number (HL7 v2 table 0203)
const MRN_TYPE_CODE: &str = "MR";

/// Translates a remote patient into the local record shape
///
/// Never fails: missing elements become empty strings or `None`.
///
/// # Example
///
/// ```
/// use fhirsync::adapters::fhir::RemotePatient;
/// use fhirsync::core::translate::to_local_patient;
/// use fhirsync::domain::TenantId;
///
/// let remote: RemotePatient = serde_json::from_str(
///     r#"{"id": "p1", "name": [{"given": ["Jane"], "family": "Doe"}]}"#,
/// ).unwrap();
/// let local = to_local_patient(&remote, &TenantId::new("clinic-a").unwrap());
///
/// assert_eq!(local.first_name, "Jane");
/// assert_eq!(local.phone, "");
/// assert_eq!(local.external_ref.remote_id, "p1");
/// ```
pub fn to_local_patient(remote: &RemotePatient, tenant_id: &TenantId) -> LocalPatientRecord {
    let name = remote.name.first();
    let first_name = name
        .and_then(|n| n.given.first())
        .cloned()
        .unwrap_or_default();
    let last_name = name
        .and_then(|n| n.family.clone())
        .unwrap_or_default();

    LocalPatientRecord {
        tenant_id: tenant_id.clone(),
        first_name,
        last_name,
        email: first_contact(&remote.telecom, "email"),
        phone: first_contact(&remote.telecom, "phone"),
        date_of_birth: remote.birth_date.as_deref().and_then(parse_birth_date),
        gender: remote.gender.clone(),
        medical_record_number: medical_record_number(&remote.identifier),
        address: remote.address.first().and_then(to_local_address),
        external_ref: ExternalRef::fhir(remote.id.clone()),
    }
}

/// Value of the first contact point of the given system, or empty
fn first_contact(telecom: &[ContactPoint], system: &str) -> String {
    telecom
        .iter()
        .filter(|c| c.system.as_deref() == Some(system))
        .find_map(|c| c.value.clone().filter(|v| !v.trim().is_empty()))
        .unwrap_or_default()
}

/// Parses a FHIR `date`, also accepting a `dateTime` by its date prefix
pub(crate) fn parse_birth_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    let date_part = value.get(..10).unwrap_or(value);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// MRN identifier if one is marked as such, else the first identifier
fn medical_record_number(identifiers: &[Identifier]) -> Option<String> {
    let with_value = || identifiers.iter().filter(|i| i.value.is_some());

    with_value()
        .find(|i| is_mrn(i))
        .or_else(|| with_value().next())
        .and_then(|i| i.value.clone())
}

fn is_mrn(identifier: &Identifier) -> bool {
    let typed = identifier.kind.as_ref().is_some_and(|kind| {
        kind.coding
            .iter()
            .any(|c| c.code.as_deref() == Some(MRN_TYPE_CODE))
            || kind
                .text
                .as_deref()
                .is_some_and(|t| t.to_lowercase().contains("medical record") || t == "MRN")
    });

    typed
        || identifier
            .system
            .as_deref()
            .is_some_and(|s| s.to_lowercase().contains("mrn"))
}

fn to_local_address(address: &Address) -> Option<PatientAddress> {
    let local = PatientAddress {
        line: address.line.join(", "),
        city: address.city.clone().unwrap_or_default(),
        state: address.state.clone().unwrap_or_default(),
        postal_code: address.postal_code.clone().unwrap_or_default(),
        country: address.country.clone().unwrap_or_default(),
    };

    (!local.is_empty()).then_some(local)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    fn tenant() -> TenantId {
        TenantId::new("clinic-a").unwrap()
    }

    fn patient(value: serde_json::Value) -> RemotePatient {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_full_patient() {
        let remote = patient(json!({
            "resourceType": "Patient",
            "id": "erXuFYUfucBZaryVksYEcMg3",
            "identifier": [
                {"system": "urn:oid:1.2.840.114350", "value": "Z1234"},
                {"type": {"coding": [{"code": "MR"}]}, "value": "203713"}
            ],
            "name": [
                {"use": "official", "family": "Lopez", "given": ["Camila", "Maria"]},
                {"use": "nickname", "given": ["Cami"]}
            ],
            "gender": "female",
            "birthDate": "1987-09-12",
            "telecom": [
                {"system": "phone", "value": "469-555-5555", "use": "home"},
                {"system": "email", "value": "camila.lopez@example.com"},
                {"system": "phone", "value": "469-888-8888", "use": "mobile"}
            ],
            "address": [{
                "line": ["3268 West Johnson St.", "Apt 117"],
                "city": "Garland",
                "state": "TX",
                "postalCode": "75043",
                "country": "US"
            }]
        }));

        let local = to_local_patient(&remote, &tenant());

        assert_eq!(local.tenant_id, tenant());
        assert_eq!(local.first_name, "Camila");
        assert_eq!(local.last_name, "Lopez");
        assert_eq!(local.phone, "469-555-5555");
        assert_eq!(local.email, "camila.lopez@example.com");
        assert_eq!(local.date_of_birth, NaiveDate::from_ymd_opt(1987, 9, 12));
        assert_eq!(local.gender.as_deref(), Some("female"));
        assert_eq!(local.medical_record_number.as_deref(), Some("203713"));

        let address = local.address.unwrap();
        assert_eq!(address.line, "3268 West Johnson St., Apt 117");
        assert_eq!(address.postal_code, "75043");

        assert_eq!(local.external_ref.source, "FHIR");
        assert_eq!(local.external_ref.remote_id, "erXuFYUfucBZaryVksYEcMg3");
    }

    #[test]
    fn test_patient_without_telecom() {
        let local = to_local_patient(&patient(json!({"id": "p1"})), &tenant());

        assert_eq!(local.phone, "");
        assert_eq!(local.email, "");
        assert_eq!(local.first_name, "");
        assert_eq!(local.last_name, "");
        assert_eq!(local.date_of_birth, None);
        assert_eq!(local.medical_record_number, None);
        assert_eq!(local.address, None);
    }

    #[test]
    fn test_first_identifier_used_when_no_mrn() {
        let remote = patient(json!({
            "id": "p1",
            "identifier": [{"system": "urn:ssn", "value": "999"}, {"value": "123"}]
        }));
        let local = to_local_patient(&remote, &tenant());
        assert_eq!(local.medical_record_number.as_deref(), Some("999"));
    }

    #[test]
    fn test_mrn_from_system() {
        let remote = patient(json!({
            "id": "p1",
            "identifier": [
                {"system": "urn:ssn", "value": "999"},
                {"system": "https://clinic.example/mrn", "value": "MRN-42"}
            ]
        }));
        let local = to_local_patient(&remote, &tenant());
        assert_eq!(local.medical_record_number.as_deref(), Some("MRN-42"));
    }

    #[test]
    fn test_empty_address_is_dropped() {
        let remote = patient(json!({"id": "p1", "address": [{"line": []}]}));
        assert_eq!(to_local_patient(&remote, &tenant()).address, None);
    }

    #[test_case("1990-05-17", Some((1990, 5, 17)) ; "plain date")]
    #[test_case("1990-05-17T00:00:00Z", Some((1990, 5, 17)) ; "date time prefix")]
    #[test_case(" 1990-05-17 ", Some((1990, 5, 17)) ; "surrounding whitespace")]
    #[test_case("1990-05", None ; "partial date")]
    #[test_case("17/05/1990", None ; "wrong format")]
    #[test_case("1990-02-30", None ; "impossible date")]
    #[test_case("", None ; "empty")]
    fn test_parse_birth_date(input: &str, expected: Option<(i32, u32, u32)>) {
        let expected = expected.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d));
        assert_eq!(parse_birth_date(input), expected);
    }

    #[test]
    fn test_contact_without_value_is_skipped() {
        let remote = patient(json!({
            "id": "p1",
            "telecom": [
                {"system": "phone"},
                {"system": "phone", "value": "555-0100"}
            ]
        }));
        assert_eq!(to_local_patient(&remote, &tenant()).phone, "555-0100");
    }
}
