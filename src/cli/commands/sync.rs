//! Sync command implementation
//!
//! Syncs one patient and its observations from a provider into the record
//! store.

use super::{
    load_or_report, EXIT_CONFIG, EXIT_CONNECTION, EXIT_FATAL, EXIT_PARTIAL, EXIT_SUCCESS,
};
use crate::core::SyncContext;
use crate::domain::TenantId;
use clap::Args;

/// Arguments for the sync command
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Provider key (e.g. epic, cerner)
    pub provider: String,

    /// Remote FHIR Patient id
    pub patient_id: String,

    /// Tenant (clinic) that owns the synced records
    #[arg(long, env = "FHIRSYNC_TENANT")]
    pub tenant: String,

    /// Keep records in memory only
    #[arg(long)]
    pub dry_run: bool,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

impl SyncArgs {
    /// Execute the sync command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let tenant = match TenantId::new(self.tenant.as_str()) {
            Ok(t) => t,
            Err(e) => {
                println!("❌ {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        let mut config = match load_or_report(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        if self.dry_run {
            tracing::info!("Dry run mode enabled from CLI");
            config.application.dry_run = true;
        }

        if config.application.dry_run {
            println!("🔍 DRY RUN MODE - records are kept in memory only");
            println!();
        }

        let context = match SyncContext::from_config(&config).await {
            Ok(c) => c,
            Err(e) => {
                crate::log_error_with_context!(e, "Failed to initialize sync");
                println!("❌ Failed to initialize sync: {e}");
                return Ok(EXIT_FATAL);
            }
        };

        let result = context
            .orchestrator()
            .sync_patient(&tenant, &self.patient_id, &self.provider)
            .await;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            println!("📊 Sync Summary:");
            println!("  Provider: {}", self.provider);
            println!("  Patient: {}", self.patient_id);
            println!("  Patients synced: {}", result.patients_synced);
            println!("  Observations synced: {}", result.observations_synced);
            println!("  Finished: {}", result.last_sync_time.to_rfc3339());
            println!();

            if result.has_errors() {
                println!("⚠️  Errors encountered:");
                for error in &result.errors {
                    println!("  - {error}");
                }
                println!();
            }
        }

        let exit_code = if !result.success {
            if !self.json {
                println!("❌ Sync failed");
            }
            EXIT_CONNECTION
        } else if result.has_errors() {
            if !self.json {
                println!("⚠️  Sync completed with errors");
            }
            EXIT_PARTIAL
        } else {
            if !self.json {
                println!("✅ Sync completed successfully!");
            }
            EXIT_SUCCESS
        };

        Ok(exit_code)
    }
}
