//! External system integrations for fhirsync.
//!
//! - [`fhir`] - EMR FHIR R4 servers (provider registry, OAuth2 tokens, REST reads)
//! - [`persistence`] - record stores the sync writes into
//!
//! # FHIR Adapter
//!
//! ```rust,no_run
//! use fhirsync::adapters::fhir::{FhirClient, ProviderRegistry, TokenStore};
//! use fhirsync::config::load_config;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("fhirsync.toml")?;
//! let registry = Arc::new(ProviderRegistry::from_config(&config, Arc::new(TokenStore::new()))?);
//! let client = FhirClient::new(registry, &config.http)?;
//!
//! let metadata = client.fetch_metadata("epic").await?;
//! println!("FHIR {:?}", metadata.fhir_version);
//! # Ok(())
//! # }
//! ```
//!
//! # Record Stores
//!
//! ```rust,no_run
//! use fhirsync::adapters::persistence::create_record_store;
//! use fhirsync::config::FhirsyncConfig;
//!
//! # async fn example() -> fhirsync::domain::Result<()> {
//! let store = create_record_store(&FhirsyncConfig::default()).await?;
//! println!("writing to {}", store.backend_name());
//! # Ok(())
//! # }
//! ```

pub mod fhir;
pub mod persistence;
