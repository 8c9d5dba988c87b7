//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for fhirsync using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// fhirsync - EMR/FHIR sync adapter
#[derive(Parser, Debug)]
#[command(name = "fhirsync")]
#[command(version, about, long_about = None)]
#[command(author = "Fhirsync Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "fhirsync.toml", env = "FHIRSYNC_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "FHIRSYNC_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check connectivity and credentials for a provider
    TestConnection(commands::test_connection::TestConnectionArgs),

    /// Fetch one patient and print the translated record
    FetchPatient(commands::fetch_patient::FetchPatientArgs),

    /// Sync a patient and its observations into the record store
    Sync(commands::sync::SyncArgs),

    /// Dispatch a webhook event from a JSON file
    Webhook(commands::webhook::WebhookArgs),

    /// List configured providers
    Providers(commands::providers::ProvidersArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_test_connection() {
        let cli = Cli::parse_from(["fhirsync", "test-connection", "epic"]);
        assert_eq!(cli.config, "fhirsync.toml");
        match cli.command {
            Commands::TestConnection(args) => assert_eq!(args.provider, "epic"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["fhirsync", "--config", "custom.toml", "providers"]);
        assert_eq!(cli.config, "custom.toml");
        assert!(matches!(cli.command, Commands::Providers(_)));
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["fhirsync", "--log-level", "debug", "validate-config"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_sync() {
        let cli = Cli::parse_from([
            "fhirsync",
            "sync",
            "cerner",
            "12724066",
            "--tenant",
            "clinic-a",
            "--dry-run",
        ]);
        match cli.command {
            Commands::Sync(args) => {
                assert_eq!(args.provider, "cerner");
                assert_eq!(args.patient_id, "12724066");
                assert_eq!(args.tenant, "clinic-a");
                assert!(args.dry_run);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_fetch_patient_default_tenant() {
        let cli = Cli::parse_from(["fhirsync", "fetch-patient", "epic", "p1"]);
        match cli.command {
            Commands::FetchPatient(args) => {
                assert_eq!(args.tenant, "preview");
                assert!(!args.raw);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_webhook() {
        let cli = Cli::parse_from(["fhirsync", "webhook", "event.json"]);
        assert!(matches!(cli.command, Commands::Webhook(_)));
    }
}
