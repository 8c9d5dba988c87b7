// fhirsync - EMR/FHIR Sync Adapter
// Copyright (c) 2025 Fhirsync Contributors
// Licensed under the MIT License

use clap::Parser;
use fhirsync::cli::{Cli, Commands};
use fhirsync::config::load_config;
use fhirsync::logging::init_logging;
use std::process;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Logging settings come from the config file when it loads; commands
    // report load errors themselves
    let file_config = load_config(&cli.config).ok();
    let log_level = cli
        .log_level
        .clone()
        .or_else(|| file_config.as_ref().map(|c| c.application.log_level.clone()))
        .unwrap_or_else(|| "info".to_string());
    let logging_config = file_config.map(|c| c.logging).unwrap_or_default();

    let guard = match init_logging(&log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(5);
        }
    };

    tracing::debug!(
        version = env!("CARGO_PKG_VERSION"),
        "fhirsync - EMR/FHIR Sync Adapter"
    );

    let exit_code = match execute_command(&cli).await {
        Ok(code) => code,
        Err(e) => {
            fhirsync::log_error_with_context!(e, "Command execution failed");
            eprintln!("Error: {e}");
            5
        }
    };

    drop(guard);
    process::exit(exit_code);
}

/// Execute the CLI command
async fn execute_command(cli: &Cli) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::TestConnection(args) => args.execute(&cli.config).await,
        Commands::FetchPatient(args) => args.execute(&cli.config).await,
        Commands::Sync(args) => args.execute(&cli.config).await,
        Commands::Webhook(args) => args.execute().await,
        Commands::Providers(args) => args.execute(&cli.config).await,
        Commands::ValidateConfig(args) => args.execute(&cli.config).await,
    }
}
