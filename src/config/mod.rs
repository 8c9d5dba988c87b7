//! Configuration management for fhirsync.
//!
//! TOML configuration with `${VAR}` substitution, `FHIRSYNC_*` environment
//! overrides and validation on load.
//!
//! # Example Configuration
//!
//! ```toml
//! environment = "production"
//!
//! [application]
//! log_level = "info"
//!
//! [http]
//! timeout_seconds = 30
//!
//! [providers.epic]
//! base_url = "https://fhir.epic.example/api/FHIR/R4"
//! client_id = "fertility-counseling"
//! client_secret = "${EPIC_CLIENT_SECRET}"
//! scopes = ["system/Patient.read", "system/Observation.read"]
//!
//! [providers.cerner]
//! base_url = "https://fhir-ehr.cerner.example/r4/tenant"
//! client_id = "fertility-counseling"
//! client_secret = "${CERNER_CLIENT_SECRET}"
//! enabled = false
//!
//! [persistence]
//! backend = "postgresql"
//!
//! [persistence.postgresql]
//! connection_string = "${DATABASE_URL}"
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use fhirsync::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("fhirsync.toml")?;
//! for key in config.providers.keys() {
//!     println!("provider: {key}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, parse_config};
pub use schema::{
    ApplicationConfig, Environment, FhirsyncConfig, HttpConfig, LoggingConfig,
    PersistenceBackend, PersistenceConfig, PostgreSQLConfig, ProviderConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
