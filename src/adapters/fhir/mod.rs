//! FHIR R4 integration
//!
//! - [`ProviderRegistry`] - configured providers and their enabled flags
//! - [`TokenCache`] / [`TokenStore`] - OAuth2 client-credentials tokens
//! - [`FhirClient`] - Patient, Observation and metadata reads
//! - [`models`] - FHIR wire types

pub mod client;
pub mod models;
pub mod registry;
pub mod token;

pub use client::{build_http_client, FhirClient, FHIR_JSON};
pub use models::{RemoteObservation, RemotePatient, ServerMetadata};
pub use registry::ProviderRegistry;
pub use token::{
    CachedToken, TokenCache, TokenStore, DEFAULT_EXPIRES_IN_SECONDS, MAX_EXPIRES_IN_SECONDS,
};
