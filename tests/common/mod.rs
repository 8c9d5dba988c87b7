//! Shared fixtures for integration tests
//!
//! Providers point at a mockito server: `epic` is enabled, `cerner` starts
//! disabled. Each provider lives under its own path prefix so mocks for one
//! never answer requests for the other.

#![allow(dead_code)]

use fhirsync::adapters::persistence::InMemoryStore;
use fhirsync::config::{parse_config, FhirsyncConfig};
use fhirsync::core::SyncContext;
use mockito::{Matcher, Mock, ServerGuard};
use serde_json::{json, Value};
use std::sync::Arc;

pub const EPIC_PATH: &str = "/epic/api/FHIR/R4";
pub const CERNER_PATH: &str = "/cerner/r4/tenant";

/// `Basic base64("epic-client:epic-secret")`
pub const EPIC_BASIC_AUTH: &str = "Basic ZXBpYy1jbGllbnQ6ZXBpYy1zZWNyZXQ=";

pub fn test_config(server_url: &str) -> FhirsyncConfig {
    let toml = format!(
        r#"
[http]
timeout_seconds = 5
connect_timeout_seconds = 2
max_pages = 3

[providers.epic]
base_url = "{server_url}{EPIC_PATH}"
client_id = "epic-client"
client_secret = "epic-secret"

[providers.cerner]
base_url = "{server_url}{CERNER_PATH}"
client_id = "cerner-client"
client_secret = "cerner-secret"
enabled = false
"#
    );

    parse_config(&toml).expect("test configuration should be valid")
}

/// Context wired to the mock server with an in-memory store
pub fn test_context(server: &ServerGuard) -> (SyncContext, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::new());
    let context = SyncContext::with_store(&test_config(&server.url()), store.clone())
        .expect("context should build");
    (context, store)
}

/// Token endpoint for Epic answering `hits` times with `token`
pub async fn mock_epic_token(
    server: &mut ServerGuard,
    token: &str,
    expires_in: i64,
    hits: usize,
) -> Mock {
    let path = format!("{EPIC_PATH}/oauth2/token");
    server
        .mock("POST", path.as_str())
        .match_header("authorization", EPIC_BASIC_AUTH)
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("grant_type".into(), "client_credentials".into()),
            Matcher::UrlEncoded(
                "scope".into(),
                "system/Patient.read system/Observation.read".into(),
            ),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "access_token": token,
                "token_type": "Bearer",
                "expires_in": expires_in
            })
            .to_string(),
        )
        .expect(hits)
        .create_async()
        .await
}

/// `GET Patient/{id}` for Epic
pub async fn mock_epic_patient(
    server: &mut ServerGuard,
    patient_id: &str,
    status: usize,
    body: Value,
    hits: usize,
) -> Mock {
    let path = format!("{EPIC_PATH}/Patient/{patient_id}");
    server
        .mock("GET", path.as_str())
        .with_status(status)
        .with_header("content-type", "application/fhir+json")
        .with_body(body.to_string())
        .expect(hits)
        .create_async()
        .await
}

/// First page of `GET Observation?patient={id}` for Epic
pub async fn mock_epic_observations(
    server: &mut ServerGuard,
    patient_id: &str,
    status: usize,
    body: Value,
    hits: usize,
) -> Mock {
    let path = format!("{EPIC_PATH}/Observation");
    server
        .mock("GET", path.as_str())
        .match_query(Matcher::UrlEncoded("patient".into(), patient_id.into()))
        .with_status(status)
        .with_header("content-type", "application/fhir+json")
        .with_body(body.to_string())
        .expect(hits)
        .create_async()
        .await
}

pub fn patient_resource(id: &str) -> Value {
    json!({
        "resourceType": "Patient",
        "id": id,
        "identifier": [
            {"system": "urn:oid:1.2.840.114350", "value": "E4005"},
            {
                "type": {"coding": [{"code": "MR"}], "text": "MRN"},
                "system": "urn:oid:1.2.840.114350.1.13.0.1.7.5.737384.14",
                "value": "203713"
            }
        ],
        "name": [{"use": "official", "family": "Lopez", "given": ["Camila", "Maria"]}],
        "gender": "female",
        "birthDate": "1987-09-12",
        "telecom": [
            {"system": "phone", "value": "469-555-5555", "use": "home"},
            {"system": "email", "value": "camila.lopez@example.com"}
        ],
        "address": [{
            "line": ["3268 West Johnson St.", "Apt 117"],
            "city": "Garland",
            "state": "TX",
            "postalCode": "75043",
            "country": "US"
        }]
    })
}

pub fn observation_resource(id: &str, loinc: &str, value: f64, unit: &str) -> Value {
    json!({
        "resourceType": "Observation",
        "id": id,
        "status": "final",
        "category": [{"coding": [{"code": "laboratory"}]}],
        "code": {"coding": [{"system": "http://loinc.org", "code": loinc, "display": loinc}]},
        "valueQuantity": {"value": value, "unit": unit},
        "effectiveDateTime": "2024-03-02T08:15:00Z"
    })
}

/// Search-set Bundle holding `resources`, with an optional `next` link
pub fn bundle(resources: Vec<Value>, next: Option<&str>) -> Value {
    let mut link = vec![json!({"relation": "self", "url": "https://fhir.example/self"})];
    if let Some(next) = next {
        link.push(json!({"relation": "next", "url": next}));
    }

    json!({
        "resourceType": "Bundle",
        "type": "searchset",
        "link": link,
        "entry": resources
            .into_iter()
            .map(|resource| json!({"resource": resource}))
            .collect::<Vec<_>>()
    })
}
