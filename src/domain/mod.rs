//! Domain models and types for fhirsync.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`ProviderKey`], [`TenantId`], [`LocalId`])
//! - **Provider model** ([`Provider`], [`Vendor`])
//! - **Local record shapes** ([`LocalPatientRecord`], [`LocalObservationRecord`])
//! - **Error types** ([`FhirsyncError`], [`EmrError`])
//! - **Result type aliases** ([`Result`], [`EmrResult`])
//!
//! # Error Handling
//!
//! Crate-level operations return [`Result<T>`]; single EMR calls return
//! [`EmrResult<T>`] so callers can match on the typed outcome:
//!
//! ```rust
//! use fhirsync::domain::{EmrError, EmrResult};
//!
//! fn describe(outcome: EmrResult<()>) -> &'static str {
//!     match outcome {
//!         Ok(()) => "ok",
//!         Err(EmrError::NotFound(_)) => "missing",
//!         Err(e) if e.is_unavailable() => "integration unavailable",
//!         Err(_) => "failed",
//!     }
//! }
//! ```

pub mod errors;
pub mod ids;
pub mod provider;
pub mod records;
pub mod result;

// Re-export commonly used types for convenience
pub use errors::{EmrError, FhirsyncError};
pub use ids::{LocalId, ProviderKey, TenantId};
pub use provider::{Provider, Vendor};
pub use records::{
    ExternalRef, LocalObservationRecord, LocalPatientRecord, PatientAddress, FHIR_SOURCE,
};
pub use result::{EmrResult, Result};
