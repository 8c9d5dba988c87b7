//! Core business logic for fhirsync.
//!
//! # Modules
//!
//! - [`translate`] - Pure FHIR → local record translation
//! - [`sync`] - Patient sync orchestration and result reporting
//! - [`connection`] - Provider connectivity checks
//! - [`webhook`] - Inbound webhook routing
//! - [`context`] - Wiring of the above from configuration
//!
//! # Sync Workflow
//!
//! 1. **Resolve provider**: unknown or disabled providers fail without network calls
//! 2. **Authenticate**: reuse the cached token or run a client-credentials exchange
//! 3. **Fetch patient**: `GET Patient/{id}`
//! 4. **Store patient**: translate and upsert, keyed by tenant and remote id
//! 5. **Fetch observations**: `GET Observation?patient={id}`, all pages
//! 6. **Store observations**: translate and upsert each, recording item failures
//! 7. **Report**: return a [`sync::SyncResult`]
//!
//! # Example
//!
//! ```rust,no_run
//! use fhirsync::config::load_config;
//! use fhirsync::core::SyncContext;
//! use fhirsync::domain::TenantId;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("fhirsync.toml")?;
//! let context = SyncContext::from_config(&config).await?;
//!
//! let tenant = TenantId::new("clinic-a")?;
//! let result = context
//!     .orchestrator()
//!     .sync_patient(&tenant, "e63wRTbPfr1p8UW81d8Seiw3", "epic")
//!     .await;
//!
//! println!("{} observations synced", result.observations_synced);
//! # Ok(())
//! # }
//! ```

pub mod connection;
pub mod context;
pub mod sync;
pub mod translate;
pub mod webhook;

pub use connection::{ConnectionTestResult, ConnectionTester};
pub use context::SyncContext;
pub use sync::{SyncOrchestrator, SyncResult};
pub use webhook::{
    LoggingWebhookHandler, WebhookDispatcher, WebhookEvent, WebhookEventKind, WebhookHandler,
    WebhookOutcome,
};
