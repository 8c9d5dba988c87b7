// fhirsync - EMR/FHIR Sync Adapter
// Copyright (c) 2025 Fhirsync Contributors
// Licensed under the MIT License

//! # fhirsync - EMR/FHIR Sync Adapter
//!
//! fhirsync pulls patient demographics and clinical observations from external
//! EMR systems (Epic, Cerner, Allscripts, athenahealth or any FHIR R4 server)
//! into a multi-tenant clinic platform.
//!
//! ## Overview
//!
//! - **Authenticating** with OAuth2 client credentials, caching tokens per provider
//! - **Reading** Patient and Observation resources over FHIR REST
//! - **Translating** FHIR resources into local record shapes
//! - **Syncing** a patient and its observations with partial-failure reporting
//! - **Testing** provider connectivity
//! - **Dispatching** inbound webhook events
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (translation, sync, connection tests, webhooks)
//! - [`adapters`] - External integrations (FHIR servers, record stores)
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fhirsync::config::load_config;
//! use fhirsync::core::SyncContext;
//! use fhirsync::domain::TenantId;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("fhirsync.toml")?;
//!     let context = SyncContext::from_config(&config).await?;
//!
//!     let check = context.connection_tester().test_connection("epic").await;
//!     println!("{} ({} ms)", check.message, check.response_time_ms);
//!
//!     let result = context
//!         .orchestrator()
//!         .sync_patient(&TenantId::new("clinic-a")?, "e63wRTbPfr1p8UW81d8Seiw3", "epic")
//!         .await;
//!     println!("Synced {} observations", result.observations_synced);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Single EMR calls return [`domain::EmrResult`] with a typed
//! [`domain::EmrError`]; everything else returns [`domain::Result`] with
//! [`domain::FhirsyncError`]. A sync never fails as a whole: step failures
//! are collected in [`core::SyncResult::errors`].
//!
//! ```rust,no_run
//! use fhirsync::adapters::fhir::FhirClient;
//! use fhirsync::domain::EmrError;
//!
//! # async fn example(client: &FhirClient) {
//! match client.fetch_patient("epic", "unknown-id").await {
//!     Ok(patient) => println!("found {}", patient.id),
//!     Err(EmrError::NotFound(what)) => println!("{what} does not exist"),
//!     Err(e) if e.is_unavailable() => println!("integration unavailable: {e}"),
//!     Err(e) => println!("failed: {e}"),
//! }
//! # }
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
