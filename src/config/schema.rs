//! Configuration schema types
//!
//! This module defines the configuration structure that maps to the TOML file.

use crate::config::SecretString;
use crate::domain::{Provider, ProviderKey, Vendor};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Runtime environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Development environment
    #[default]
    Development,
    /// Staging environment
    Staging,
    /// Production environment
    Production,
}

/// Record store backend selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PersistenceBackend {
    /// Process-local store, nothing survives the process
    #[default]
    Memory,
    /// PostgreSQL database
    PostgreSQL,
}

/// Main fhirsync configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FhirsyncConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Runtime environment (development, staging, production)
    #[serde(default)]
    pub environment: Environment,

    /// Outbound HTTP settings shared by all providers
    #[serde(default)]
    pub http: HttpConfig,

    /// EMR providers keyed by provider key
    #[serde(default)]
    pub providers: BTreeMap<String, ProviderConfig>,

    /// Record store settings
    #[serde(default)]
    pub persistence: PersistenceConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl FhirsyncConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.http.validate(&self.environment)?;

        for (key, provider) in &self.providers {
            provider.validate(key, &self.environment)?;
        }

        self.persistence.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Materializes every configured provider
    ///
    /// # Errors
    ///
    /// Returns an error if a provider key is invalid
    pub fn build_providers(&self) -> Result<Vec<Provider>, String> {
        self.providers
            .iter()
            .map(|(key, provider)| provider.to_provider(key))
            .collect()
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dry run mode (always use the in-memory record store)
    #[serde(default)]
    pub dry_run: bool,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

/// Outbound HTTP configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Total request timeout in seconds; a timed-out call is a transport error
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Connection establishment timeout in seconds
    #[serde(default = "default_connect_timeout_seconds")]
    pub connect_timeout_seconds: u64,

    /// TLS certificate verification enabled
    ///
    /// **SECURITY WARNING**: disabling verification exposes PHI to
    /// man-in-the-middle attacks. Rejected in production.
    #[serde(default = "default_true")]
    pub tls_verify: bool,

    /// Maximum number of Bundle pages followed for one search
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
}

impl HttpConfig {
    fn validate(&self, environment: &Environment) -> Result<(), String> {
        if self.timeout_seconds == 0 || self.timeout_seconds > 300 {
            return Err(format!(
                "http.timeout_seconds must be between 1 and 300, got {}",
                self.timeout_seconds
            ));
        }

        if self.connect_timeout_seconds == 0 {
            return Err("http.connect_timeout_seconds must be > 0".to_string());
        }

        if self.max_pages == 0 {
            return Err("http.max_pages must be > 0".to_string());
        }

        if *environment == Environment::Production && !self.tls_verify {
            return Err(
                "TLS certificate verification cannot be disabled in production environments"
                    .to_string(),
            );
        }

        Ok(())
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout_seconds(),
            connect_timeout_seconds: default_connect_timeout_seconds(),
            tls_verify: true,
            max_pages: default_max_pages(),
        }
    }
}

/// Configuration of one EMR provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Vendor tag; inferred from the provider key when omitted
    #[serde(default)]
    pub vendor: Option<Vendor>,

    /// Display name; vendor default when omitted
    #[serde(default)]
    pub display_name: Option<String>,

    /// FHIR base URL (token endpoint is `{base_url}/oauth2/token`)
    pub base_url: String,

    /// OAuth2 client id
    pub client_id: String,

    /// OAuth2 client secret
    /// Stored securely in memory and automatically zeroized on drop
    pub client_secret: SecretString,

    /// OAuth2 scopes; vendor defaults when empty
    #[serde(default)]
    pub scopes: Vec<String>,

    /// Whether the provider starts enabled
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl ProviderConfig {
    fn validate(&self, key: &str, environment: &Environment) -> Result<(), String> {
        use secrecy::ExposeSecret;

        ProviderKey::new(key)?;

        if self.base_url.is_empty() {
            return Err(format!("providers.{key}.base_url cannot be empty"));
        }

        let url = url::Url::parse(&self.base_url)
            .map_err(|e| format!("providers.{key}.base_url is not a valid URL: {e}"))?;

        match url.scheme() {
            "https" => {}
            "http" if *environment != Environment::Production => {}
            "http" => {
                return Err(format!(
                    "providers.{key}.base_url must use https in production environments"
                ))
            }
            other => {
                return Err(format!(
                    "providers.{key}.base_url must start with http:// or https://, got scheme '{other}'"
                ))
            }
        }

        if self.client_id.trim().is_empty() {
            return Err(format!("providers.{key}.client_id cannot be empty"));
        }

        if self.client_secret.expose_secret().is_empty() {
            return Err(format!("providers.{key}.client_secret cannot be empty"));
        }

        if self.scopes.iter().any(|s| s.trim().is_empty() || s.contains(' ')) {
            return Err(format!(
                "providers.{key}.scopes must not contain empty entries or spaces"
            ));
        }

        Ok(())
    }

    /// Builds the runtime [`Provider`] for this entry
    ///
    /// # Errors
    ///
    /// Returns an error if `key` is not a valid provider key
    pub fn to_provider(&self, key: &str) -> Result<Provider, String> {
        let key = ProviderKey::new(key)?;
        let vendor = self.vendor.unwrap_or_else(|| Vendor::infer(key.as_str()));

        let display_name = self
            .display_name
            .clone()
            .unwrap_or_else(|| vendor.default_display_name().to_string());

        let scopes = if self.scopes.is_empty() {
            vendor.default_scopes()
        } else {
            self.scopes.clone()
        };

        Ok(Provider {
            key,
            vendor,
            display_name,
            base_url: self.base_url.trim_end_matches('/').to_string(),
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            scopes,
            enabled: self.enabled,
        })
    }
}

/// Record store configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Backend selection (memory or postgresql)
    #[serde(default)]
    pub backend: PersistenceBackend,

    /// PostgreSQL configuration (required if backend = postgresql)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postgresql: Option<PostgreSQLConfig>,
}

impl PersistenceConfig {
    fn validate(&self) -> Result<(), String> {
        match self.backend {
            PersistenceBackend::Memory => Ok(()),
            PersistenceBackend::PostgreSQL => match self.postgresql {
                Some(ref config) => config.validate(),
                None => Err(
                    "persistence.postgresql configuration is required when backend = 'postgresql'"
                        .to_string(),
                ),
            },
        }
    }
}

/// PostgreSQL configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostgreSQLConfig {
    /// Connection string (may embed credentials)
    pub connection_string: SecretString,

    /// Maximum pooled connections
    #[serde(default = "default_pg_max_connections")]
    pub max_connections: usize,

    /// Pool wait/create timeout in seconds
    #[serde(default = "default_pg_connection_timeout_seconds")]
    pub connection_timeout_seconds: u64,

    /// SSL mode (disable, prefer, require)
    #[serde(default = "default_pg_ssl_mode")]
    pub ssl_mode: String,
}

impl PostgreSQLConfig {
    fn validate(&self) -> Result<(), String> {
        use secrecy::ExposeSecret;

        if self.connection_string.expose_secret().is_empty() {
            return Err("persistence.postgresql.connection_string cannot be empty".to_string());
        }

        if self.max_connections == 0 || self.max_connections > 100 {
            return Err(format!(
                "persistence.postgresql.max_connections must be between 1 and 100, got {}",
                self.max_connections
            ));
        }

        let valid_modes = ["disable", "prefer", "require"];
        if !valid_modes.contains(&self.ssl_mode.as_str()) {
            return Err(format!(
                "Invalid persistence.postgresql.ssl_mode '{}'. Must be one of: {}",
                self.ssl_mode,
                valid_modes.join(", ")
            ));
        }

        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local JSON file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local_enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_connect_timeout_seconds() -> u64 {
    10
}

fn default_max_pages() -> usize {
    20
}

fn default_pg_max_connections() -> usize {
    10
}

fn default_pg_connection_timeout_seconds() -> u64 {
    30
}

fn default_pg_ssl_mode() -> String {
    "prefer".to_string()
}

fn default_local_path() -> String {
    "/var/log/fhirsync".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
