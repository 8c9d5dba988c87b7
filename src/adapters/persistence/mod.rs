//! Record stores for synced patients and observations
//!
//! - [`InMemoryStore`] - default, used for dry runs and tests
//! - [`PostgresStore`] - PostgreSQL via deadpool-postgres

pub mod factory;
pub mod memory;
pub mod postgres;
pub mod traits;

pub use factory::create_record_store;
pub use memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use traits::RecordStore;
