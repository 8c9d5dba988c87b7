//! Resource translation
//!
//! Pure mappings from FHIR resources to local record shapes. Translation is
//! total: every well-formed resource yields a record, with missing elements
//! defaulted.

pub mod observation;
pub mod patient;

pub use observation::to_local_observation;
pub use patient::to_local_patient;
