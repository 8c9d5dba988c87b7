//! Logging and observability
//!
//! Structured logging via `tracing`:
//! - Console output with configurable level (`RUST_LOG` overrides)
//! - Optional JSON file logging with rotation
//! - Macros for the recurring sync events
//!
//! Access tokens, client secrets and connection strings are never logged.
//!
//! # Example
//!
//! ```no_run
//! use fhirsync::logging::init_logging;
//! use fhirsync::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(provider = "epic", "Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of a patient sync
///
/// # Example
///
/// ```no_run
/// use fhirsync::log_sync_start;
/// use fhirsync::domain::TenantId;
///
/// let tenant = TenantId::new("clinic-a").unwrap();
/// log_sync_start!(&tenant, "epic", "e63wRTbPfr1p8UW81d8Seiw3");
/// ```
#[macro_export]
macro_rules! log_sync_start {
    ($tenant_id:expr, $provider:expr, $patient_id:expr) => {
        tracing::info!(
            tenant_id = %$tenant_id,
            provider = %$provider,
            patient_id = %$patient_id,
            "Starting patient sync"
        );
    };
}

/// Log the completion of a patient sync
///
/// # Example
///
/// ```no_run
/// use fhirsync::log_sync_complete;
/// use fhirsync::core::SyncResult;
/// use std::time::Duration;
///
/// let result = SyncResult::new();
/// log_sync_complete!(&result, Duration::from_millis(250));
/// ```
#[macro_export]
macro_rules! log_sync_complete {
    ($result:expr, $duration:expr) => {
        tracing::info!(
            success = $result.success,
            patients_synced = $result.patients_synced,
            observations_synced = $result.observations_synced,
            errors = $result.errors.len(),
            duration_ms = $duration.as_millis() as u64,
            "Patient sync finished"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use fhirsync::log_error_with_context;
/// use fhirsync::domain::FhirsyncError;
///
/// let error = FhirsyncError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
