//! EMR provider model
//!
//! A [`Provider`] is one configured FHIR endpoint with its OAuth2 client
//! credentials. The [`Vendor`] tag selects vendor defaults once, at
//! configuration time, instead of string matching at call sites.

use super::ids::ProviderKey;
use crate::config::SecretString;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported EMR vendors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vendor {
    /// Epic Systems (App Orchard / FHIR R4)
    Epic,
    /// Oracle Health (Cerner Millennium)
    Cerner,
    /// Allscripts / Veradigm
    Allscripts,
    /// athenahealth
    Athena,
    /// Any standards-compliant FHIR R4 server
    Generic,
}

impl Vendor {
    /// Infers the vendor from a provider key, falling back to [`Vendor::Generic`]
    pub fn infer(key: &str) -> Self {
        key.parse().unwrap_or(Vendor::Generic)
    }

    /// Display name used when configuration does not override it
    pub fn default_display_name(&self) -> &'static str {
        match self {
            Vendor::Epic => "Epic",
            Vendor::Cerner => "Cerner",
            Vendor::Allscripts => "Allscripts",
            Vendor::Athena => "athenahealth",
            Vendor::Generic => "FHIR Server",
        }
    }

    /// Scopes requested when configuration does not list any
    pub fn default_scopes(&self) -> Vec<String> {
        let scopes: &[&str] = match self {
            Vendor::Epic => &["system/Patient.read", "system/Observation.read"],
            Vendor::Cerner => &["system/Patient.read", "system/Observation.read"],
            Vendor::Allscripts => &["patient/*.read"],
            Vendor::Athena => &["system/Patient.read", "system/Observation.read"],
            Vendor::Generic => &["system/*.read"],
        };
        scopes.iter().map(|s| s.to_string()).collect()
    }
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Vendor::Epic => "epic",
            Vendor::Cerner => "cerner",
            Vendor::Allscripts => "allscripts",
            Vendor::Athena => "athena",
            Vendor::Generic => "generic",
        };
        write!(f, "{name}")
    }
}

impl FromStr for Vendor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "epic" => Ok(Vendor::Epic),
            "cerner" | "oracle" => Ok(Vendor::Cerner),
            "allscripts" | "veradigm" => Ok(Vendor::Allscripts),
            "athena" | "athenahealth" => Ok(Vendor::Athena),
            "generic" | "fhir" => Ok(Vendor::Generic),
            other => Err(format!(
                "Unsupported EMR vendor: {other}. Supported vendors: epic, cerner, allscripts, athena, generic"
            )),
        }
    }
}

/// One configured EMR provider
///
/// All fields are fixed at startup except `enabled`, which the registry
/// tracks separately and stamps onto the snapshots it hands out.
#[derive(Debug, Clone)]
pub struct Provider {
    /// Unique key, e.g. `epic`
    pub key: ProviderKey,

    /// Vendor tag
    pub vendor: Vendor,

    /// Human-readable name
    pub display_name: String,

    /// FHIR base URL without trailing slash
    pub base_url: String,

    /// OAuth2 client id
    pub client_id: String,

    /// OAuth2 client secret
    pub client_secret: SecretString,

    /// OAuth2 scopes, sent space-separated
    pub scopes: Vec<String>,

    /// Whether the provider may be used
    pub enabled: bool,
}

impl Provider {
    /// Scope parameter for the client-credentials grant
    pub fn scope_param(&self) -> String {
        self.scopes.join(" ")
    }

    /// OAuth2 token endpoint
    pub fn token_url(&self) -> String {
        format!("{}/oauth2/token", self.base_url)
    }

    /// URL of a FHIR path relative to the base URL
    pub fn fhir_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}
