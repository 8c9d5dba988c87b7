//! Domain error types
//!
//! This module defines the error hierarchy for fhirsync.
//! All errors are domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main fhirsync error type
///
/// This is the primary error type used throughout the crate.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum FhirsyncError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// EMR / FHIR integration errors
    #[error("EMR error: {0}")]
    Emr(#[from] EmrError),

    /// Record store errors
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Webhook handler errors
    #[error("Webhook error: {0}")]
    Webhook(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// EMR integration errors
///
/// Outcomes of provider lookup, token exchange and FHIR calls.
/// These errors don't expose third-party HTTP client types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EmrError {
    /// No provider is configured under this key
    #[error("EMR provider not configured: {0}")]
    ProviderNotFound(String),

    /// Provider is configured but disabled
    #[error("EMR provider disabled: {0}")]
    ProviderDisabled(String),

    /// Token exchange failed or the server rejected the credentials (401)
    #[error("Authentication failed: {0}")]
    AuthFailure(String),

    /// Remote resource does not exist (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Network failure, timeout, or non-2xx response
    #[error("Transport error{}: {message}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    Transport {
        status: Option<u16>,
        message: String,
    },

    /// 2xx response whose body could not be decoded
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    /// Caller-supplied resource id is not a valid FHIR id
    #[error("Invalid FHIR resource id: '{0}'")]
    InvalidId(String),
}

impl EmrError {
    /// Build a transport error for a non-2xx status
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        EmrError::Transport {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Build a transport error for a network-level failure
    pub fn network(message: impl Into<String>) -> Self {
        EmrError::Transport {
            status: None,
            message: message.into(),
        }
    }

    /// Whether this is an authentication failure
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, EmrError::AuthFailure(_))
    }

    /// Whether the failure is a configuration-level outcome (no network attempted)
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            EmrError::ProviderNotFound(_) | EmrError::ProviderDisabled(_)
        )
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for FhirsyncError {
    fn from(err: std::io::Error) -> Self {
        FhirsyncError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for FhirsyncError {
    fn from(err: serde_json::Error) -> Self {
        FhirsyncError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for FhirsyncError {
    fn from(err: toml::de::Error) -> Self {
        FhirsyncError::Configuration(format!("TOML parse error: {err}"))
    }
}
