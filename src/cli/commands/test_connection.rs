//! Test connection command implementation
//!
//! Checks that a provider is reachable with valid credentials by fetching
//! its CapabilityStatement.

use super::{load_or_report, EXIT_CONNECTION, EXIT_FATAL, EXIT_SUCCESS};
use crate::core::SyncContext;
use clap::Args;

/// Arguments for the test-connection command
#[derive(Args, Debug)]
pub struct TestConnectionArgs {
    /// Provider key (e.g. epic, cerner)
    pub provider: String,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

impl TestConnectionArgs {
    /// Execute the test-connection command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(provider = %self.provider, "Testing EMR connection");

        let config = match load_or_report(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        let context = match SyncContext::from_config(&config).await {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to initialize: {e}");
                return Ok(EXIT_FATAL);
            }
        };

        let result = context
            .connection_tester()
            .test_connection(&self.provider)
            .await;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else if result.success {
            println!("✅ {}", result.message);
            println!("   Response time: {} ms", result.response_time_ms);
        } else {
            println!("❌ {}", result.message);
        }

        Ok(if result.success {
            EXIT_SUCCESS
        } else {
            EXIT_CONNECTION
        })
    }
}
