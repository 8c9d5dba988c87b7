//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{FhirsyncConfig, PersistenceBackend};
use super::secret::secret_string;
use crate::domain::errors::FhirsyncError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Prefix of every environment override
const ENV_PREFIX: &str = "FHIRSYNC_";

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into FhirsyncConfig
/// 4. Applies environment variable overrides (FHIRSYNC_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if the file cannot be read, a referenced variable is
/// missing, TOML parsing fails, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use fhirsync::config::loader::load_config;
///
/// let config = load_config("fhirsync.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<FhirsyncConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(FhirsyncError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        FhirsyncError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&contents)
}

/// Parses and validates configuration from TOML text
///
/// Performs the same substitution, override and validation steps as
/// [`load_config`].
pub fn parse_config(contents: &str) -> Result<FhirsyncConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: FhirsyncConfig = toml::from_str(&contents)
        .map_err(|e| FhirsyncError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        FhirsyncError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| FhirsyncError::Other(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let processed = re.replace_all(line, |caps: &regex::Captures<'_>| {
            let var_name = &caps[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                    String::new()
                }
            }
        });
        result.push_str(&processed);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(FhirsyncError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Environment variable prefix for one provider, e.g. `FHIRSYNC_PROVIDER_EPIC_`
fn provider_env_prefix(key: &str) -> String {
    format!(
        "{ENV_PREFIX}PROVIDER_{}_",
        key.to_uppercase().replace('-', "_")
    )
}

/// Applies environment variable overrides using the FHIRSYNC_* prefix
///
/// Environment variables follow the pattern FHIRSYNC_<SECTION>_<KEY>, and
/// FHIRSYNC_PROVIDER_<PROVIDER>_<KEY> for provider entries, e.g.
/// FHIRSYNC_PROVIDER_EPIC_CLIENT_SECRET.
fn apply_env_overrides(config: &mut FhirsyncConfig) -> Result<()> {
    let var = |name: &str| std::env::var(format!("{ENV_PREFIX}{name}")).ok();

    // Application overrides
    if let Some(val) = var("APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some(val) = var("APPLICATION_DRY_RUN") {
        config.application.dry_run = val.parse().unwrap_or(false);
    }

    // HTTP overrides
    if let Some(val) = var("HTTP_TIMEOUT_SECONDS") {
        if let Ok(timeout) = val.parse() {
            config.http.timeout_seconds = timeout;
        }
    }
    if let Some(val) = var("HTTP_TLS_VERIFY") {
        config.http.tls_verify = val.parse().unwrap_or(true);
    }

    // Provider overrides
    for (key, provider) in config.providers.iter_mut() {
        let prefix = provider_env_prefix(key);
        let provider_var = |name: &str| std::env::var(format!("{prefix}{name}")).ok();

        if let Some(val) = provider_var("BASE_URL") {
            provider.base_url = val;
        }
        if let Some(val) = provider_var("CLIENT_ID") {
            provider.client_id = val;
        }
        if let Some(val) = provider_var("CLIENT_SECRET") {
            provider.client_secret = secret_string(val);
        }
        if let Some(val) = provider_var("ENABLED") {
            provider.enabled = val.parse().unwrap_or(provider.enabled);
        }
        if let Some(val) = provider_var("SCOPES") {
            provider.scopes = val.split_whitespace().map(str::to_string).collect();
        }
    }

    // Persistence overrides
    if let Some(val) = var("PERSISTENCE_BACKEND") {
        config.persistence.backend = match val.to_lowercase().as_str() {
            "memory" => PersistenceBackend::Memory,
            "postgresql" => PersistenceBackend::PostgreSQL,
            other => {
                return Err(FhirsyncError::Configuration(format!(
                    "Invalid {ENV_PREFIX}PERSISTENCE_BACKEND '{other}'. Must be one of: memory, postgresql"
                )))
            }
        };
    }
    if let Some(ref mut pg_config) = config.persistence.postgresql {
        if let Some(val) = var("POSTGRESQL_CONNECTION_STRING") {
            pg_config.connection_string = secret_string(val);
        }
    }

    // Logging overrides
    if let Some(val) = var("LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Some(val) = var("LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}
