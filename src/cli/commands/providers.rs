//! Providers command implementation
//!
//! Lists configured EMR providers and whether each is enabled.

use super::{load_or_report, EXIT_CONFIG, EXIT_SUCCESS};
use crate::adapters::fhir::{ProviderRegistry, TokenStore};
use clap::Args;
use std::sync::Arc;

/// Arguments for the providers command
#[derive(Args, Debug)]
pub struct ProvidersArgs {
    /// Only list enabled providers
    #[arg(long)]
    pub enabled: bool,
}

impl ProvidersArgs {
    /// Execute the providers command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_or_report(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        let registry = match ProviderRegistry::from_config(&config, Arc::new(TokenStore::new())) {
            Ok(r) => r,
            Err(e) => {
                println!("❌ {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        let keys = if self.enabled {
            registry.list_enabled()
        } else {
            registry.list_configured()
        };

        if keys.is_empty() {
            println!("No EMR providers configured.");
            return Ok(EXIT_SUCCESS);
        }

        println!("🏥 EMR Providers");
        println!();

        for provider in keys.iter().filter_map(|key| registry.get(key.as_str())) {
            let status = if provider.enabled { "✅ enabled " } else { "⏸️  disabled" };
            println!(
                "  {status}  {:<12} {:<14} {}",
                provider.key.as_str(),
                provider.display_name,
                provider.base_url
            );
        }
        println!();

        Ok(EXIT_SUCCESS)
    }
}
