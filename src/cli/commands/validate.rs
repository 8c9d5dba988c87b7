//! Validate config command implementation
//!
//! Loads and validates the configuration file and prints a summary. Secrets
//! are never printed.

use super::{EXIT_CONFIG, EXIT_SUCCESS};
use crate::config::{load_config, PersistenceBackend};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates as part of loading
        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration is valid");
                c
            }
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        println!();
        println!("Configuration Summary:");
        println!("  Environment: {:?}", config.environment);
        println!("  Log Level: {}", config.application.log_level);
        println!("  HTTP Timeout: {}s", config.http.timeout_seconds);
        println!("  TLS Verify: {}", config.http.tls_verify);

        let providers = match config.build_providers() {
            Ok(p) => p,
            Err(e) => {
                println!("❌ {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        println!("  Providers: {}", providers.len());
        for provider in &providers {
            println!(
                "    - {} ({}, {}){}",
                provider.key,
                provider.vendor,
                provider.base_url,
                if provider.enabled { "" } else { " [disabled]" }
            );
        }

        match config.persistence.backend {
            PersistenceBackend::Memory => println!("  Record Store: memory"),
            PersistenceBackend::PostgreSQL => {
                println!("  Record Store: PostgreSQL");
                if let Some(ref pg_config) = config.persistence.postgresql {
                    println!("  Max Connections: {}", pg_config.max_connections);
                    println!("  SSL Mode: {}", pg_config.ssl_mode);
                }
            }
        }

        if config.application.dry_run {
            println!("  Dry Run: enabled");
        }
        println!();

        Ok(EXIT_SUCCESS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_validate_valid_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(
            br#"
[providers.epic]
base_url = "https://fhir.epic.example/api/FHIR/R4"
client_id = "client"
client_secret = "secret"
"#,
        )
        .unwrap();
        file.flush().unwrap();

        let code = ValidateArgs {}
            .execute(&file.path().to_string_lossy())
            .await
            .unwrap();
        assert_eq!(code, EXIT_SUCCESS);
    }

    #[tokio::test]
    async fn test_validate_invalid_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[http]\ntimeout_seconds = 0\n").unwrap();
        file.flush().unwrap();

        let code = ValidateArgs {}
            .execute(&file.path().to_string_lossy())
            .await
            .unwrap();
        assert_eq!(code, EXIT_CONFIG);
    }
}
