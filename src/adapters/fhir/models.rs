//! FHIR R4 wire models
//!
//! Only the elements fhirsync reads are modelled. Every field defaults when
//! absent so that any well-formed resource decodes; unknown elements are
//! ignored.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// FHIR `Patient` resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemotePatient {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub identifier: Vec<Identifier>,

    #[serde(default)]
    pub name: Vec<HumanName>,

    #[serde(default)]
    pub gender: Option<String>,

    #[serde(default)]
    pub birth_date: Option<String>,

    #[serde(default)]
    pub telecom: Vec<ContactPoint>,

    #[serde(default)]
    pub address: Vec<Address>,
}

/// FHIR `Identifier` (e.g. MRN)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Identifier {
    #[serde(default)]
    pub system: Option<String>,

    #[serde(default)]
    pub value: Option<String>,

    #[serde(default, rename = "type")]
    pub kind: Option<CodeableConcept>,
}

/// FHIR `HumanName`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HumanName {
    #[serde(default, rename = "use")]
    pub usage: Option<String>,

    #[serde(default)]
    pub text: Option<String>,

    #[serde(default)]
    pub family: Option<String>,

    #[serde(default)]
    pub given: Vec<String>,
}

/// FHIR `ContactPoint` (phone, email, ...)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactPoint {
    #[serde(default)]
    pub system: Option<String>,

    #[serde(default)]
    pub value: Option<String>,

    #[serde(default, rename = "use")]
    pub usage: Option<String>,
}

/// FHIR `Address`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default)]
    pub line: Vec<String>,

    #[serde(default)]
    pub city: Option<String>,

    #[serde(default)]
    pub state: Option<String>,

    #[serde(default)]
    pub postal_code: Option<String>,

    #[serde(default)]
    pub country: Option<String>,
}

/// FHIR `Observation` resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteObservation {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub category: Vec<CodeableConcept>,

    #[serde(default)]
    pub code: Option<CodeableConcept>,

    #[serde(default)]
    pub subject: Option<Reference>,

    #[serde(default)]
    pub value_quantity: Option<Quantity>,

    #[serde(default)]
    pub value_string: Option<String>,

    #[serde(default)]
    pub effective_date_time: Option<String>,
}

/// FHIR `CodeableConcept`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeableConcept {
    #[serde(default)]
    pub coding: Vec<Coding>,

    #[serde(default)]
    pub text: Option<String>,
}

/// FHIR `Coding`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Coding {
    #[serde(default)]
    pub system: Option<String>,

    #[serde(default)]
    pub code: Option<String>,

    #[serde(default)]
    pub display: Option<String>,
}

/// FHIR `Reference`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(default)]
    pub reference: Option<String>,

    #[serde(default)]
    pub display: Option<String>,
}

/// FHIR `Quantity`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    #[serde(default)]
    pub value: Option<f64>,

    #[serde(default)]
    pub unit: Option<String>,

    #[serde(default)]
    pub system: Option<String>,

    #[serde(default)]
    pub code: Option<String>,
}

/// FHIR `Bundle` as returned by a search
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct Bundle {
    #[serde(default)]
    pub link: Vec<BundleLink>,

    #[serde(default)]
    pub entry: Vec<BundleEntry>,
}

impl Bundle {
    /// URL of the next search page, if any
    pub fn next_link(&self) -> Option<&str> {
        self.link
            .iter()
            .find(|l| l.relation == "next")
            .map(|l| l.url.as_str())
            .filter(|url| !url.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct BundleLink {
    #[serde(default)]
    pub relation: String,

    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct BundleEntry {
    #[serde(default)]
    pub resource: Option<Value>,
}

/// Summary of a server's `CapabilityStatement`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerMetadata {
    /// FHIR version reported by the server (e.g. `4.0.1`)
    pub fhir_version: Option<String>,

    /// Server software name and version
    pub software: Option<String>,
}

impl ServerMetadata {
    /// Extracts the interesting parts of a CapabilityStatement
    pub fn from_capability_statement(body: &Value) -> Self {
        let fhir_version = body
            .get("fhirVersion")
            .and_then(Value::as_str)
            .map(str::to_string);

        let software = body.get("software").and_then(|software| {
            let name = software.get("name").and_then(Value::as_str)?;
            match software.get("version").and_then(Value::as_str) {
                Some(version) => Some(format!("{name} {version}")),
                None => Some(name.to_string()),
            }
        });

        Self {
            fhir_version,
            software,
        }
    }
}
