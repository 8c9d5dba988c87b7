//! Fetch patient command implementation
//!
//! Reads one patient from a provider and prints the translated local record
//! without storing it.

use super::{emr_exit_code, load_or_report, EXIT_CONFIG, EXIT_FATAL, EXIT_SUCCESS};
use crate::adapters::fhir::{FhirClient, ProviderRegistry, TokenStore};
use crate::core::translate::to_local_patient;
use crate::domain::TenantId;
use clap::Args;
use std::sync::Arc;

/// Arguments for the fetch-patient command
#[derive(Args, Debug)]
pub struct FetchPatientArgs {
    /// Provider key (e.g. epic, cerner)
    pub provider: String,

    /// Remote FHIR Patient id
    pub patient_id: String,

    /// Tenant the preview record is attributed to
    #[arg(long, default_value = "preview")]
    pub tenant: String,

    /// Print the raw FHIR resource instead of the translated record
    #[arg(long)]
    pub raw: bool,
}

impl FetchPatientArgs {
    /// Execute the fetch-patient command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(provider = %self.provider, patient_id = %self.patient_id, "Fetching patient");

        let tenant = match TenantId::new(self.tenant.as_str()) {
            Ok(t) => t,
            Err(e) => {
                println!("❌ {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        let config = match load_or_report(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        let client = match ProviderRegistry::from_config(&config, Arc::new(TokenStore::new()))
            .and_then(|registry| FhirClient::new(Arc::new(registry), &config.http))
        {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to initialize: {e}");
                return Ok(EXIT_FATAL);
            }
        };

        let remote = match client.fetch_patient(&self.provider, &self.patient_id).await {
            Ok(p) => p,
            Err(e) => {
                println!("❌ {e}");
                return Ok(emr_exit_code(&e));
            }
        };

        let output = if self.raw {
            serde_json::to_string_pretty(&remote)?
        } else {
            serde_json::to_string_pretty(&to_local_patient(&remote, &tenant))?
        };
        println!("{output}");

        Ok(EXIT_SUCCESS)
    }
}
