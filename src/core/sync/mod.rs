//! Patient synchronization
//!
//! [`SyncOrchestrator`] drives one patient sync and reports a [`SyncResult`].

pub mod orchestrator;
pub mod result;

pub use orchestrator::SyncOrchestrator;
pub use result::SyncResult;
