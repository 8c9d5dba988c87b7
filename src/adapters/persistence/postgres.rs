//! PostgreSQL record store
//!
//! Pooled connections via deadpool-postgres. Upserts use `ON CONFLICT` on
//! the external reference so re-syncing a resource updates its row.

use super::traits::RecordStore;
use crate::config::PostgreSQLConfig;
use crate::domain::{
    FhirsyncError, LocalId, LocalObservationRecord, LocalPatientRecord, Result,
};
use async_trait::async_trait;
use deadpool_postgres::{Manager, ManagerConfig, Object, Pool, RecyclingMethod, Runtime};
use secrecy::ExposeSecret;
use std::time::Duration;
use tokio_postgres::config::SslMode;
use tokio_postgres::NoTls;
use uuid::Uuid;

const UPSERT_PATIENT: &str = "
    INSERT INTO patients (
        id, tenant_id, external_source, external_id, first_name, last_name,
        email, phone, date_of_birth, gender, medical_record_number, address
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
    ON CONFLICT (tenant_id, external_source, external_id) DO UPDATE SET
        first_name = EXCLUDED.first_name,
        last_name = EXCLUDED.last_name,
        email = EXCLUDED.email,
        phone = EXCLUDED.phone,
        date_of_birth = EXCLUDED.date_of_birth,
        gender = EXCLUDED.gender,
        medical_record_number = EXCLUDED.medical_record_number,
        address = EXCLUDED.address,
        updated_at = NOW()
    RETURNING id";

const UPSERT_OBSERVATION: &str = "
    INSERT INTO observations (
        id, patient_id, external_source, external_id, observation_type, display,
        value, unit, observed_at, status, categories
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
    ON CONFLICT (patient_id, external_source, external_id) DO UPDATE SET
        observation_type = EXCLUDED.observation_type,
        display = EXCLUDED.display,
        value = EXCLUDED.value,
        unit = EXCLUDED.unit,
        observed_at = EXCLUDED.observed_at,
        status = EXCLUDED.status,
        categories = EXCLUDED.categories,
        updated_at = NOW()
    RETURNING id";

/// [`RecordStore`] backed by PostgreSQL
pub struct PostgresStore {
    pool: Pool,
}

impl PostgresStore {
    /// Creates the connection pool
    ///
    /// No connection is opened until first use.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an invalid connection string or
    /// TLS setup, a persistence error if the pool cannot be built.
    pub fn new(config: &PostgreSQLConfig) -> Result<Self> {
        let mut pg_config: tokio_postgres::Config = config
            .connection_string
            .expose_secret()
            .as_ref()
            .parse()
            .map_err(|e| {
                FhirsyncError::Configuration(format!("Invalid PostgreSQL connection string: {e}"))
            })?;

        let manager_config = ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        };

        let manager = match config.ssl_mode.as_str() {
            "disable" => {
                pg_config.ssl_mode(SslMode::Disable);
                Manager::from_config(pg_config, NoTls, manager_config)
            }
            mode => {
                pg_config.ssl_mode(if mode == "require" {
                    SslMode::Require
                } else {
                    SslMode::Prefer
                });
                let connector = native_tls::TlsConnector::builder().build().map_err(|e| {
                    FhirsyncError::Configuration(format!("Failed to initialize TLS: {e}"))
                })?;
                let tls = postgres_native_tls::MakeTlsConnector::new(connector);
                Manager::from_config(pg_config, tls, manager_config)
            }
        };

        let timeout = Duration::from_secs(config.connection_timeout_seconds);
        let pool = Pool::builder(manager)
            .max_size(config.max_connections)
            .runtime(Runtime::Tokio1)
            .wait_timeout(Some(timeout))
            .create_timeout(Some(timeout))
            .recycle_timeout(Some(timeout))
            .build()
            .map_err(|e| {
                FhirsyncError::Persistence(format!("Failed to create connection pool: {e}"))
            })?;

        Ok(Self { pool })
    }

    /// Runs `SELECT 1` on a pooled connection
    pub async fn test_connection(&self) -> Result<()> {
        let client = self.connection().await?;
        client
            .query_one("SELECT 1", &[])
            .await
            .map_err(|e| FhirsyncError::Persistence(format!("Connection test failed: {e}")))?;

        tracing::info!("PostgreSQL connection test successful");
        Ok(())
    }

    /// Creates tables and indexes if they do not exist
    pub async fn ensure_schema(&self) -> Result<()> {
        let client = self.connection().await?;
        let migration_sql = include_str!("../../../migrations/001_initial_schema.sql");

        client
            .batch_execute(migration_sql)
            .await
            .map_err(|e| FhirsyncError::Persistence(format!("Failed to execute migration: {e}")))?;

        tracing::info!("PostgreSQL schema initialized");
        Ok(())
    }

    async fn connection(&self) -> Result<Object> {
        self.pool.get().await.map_err(|e| {
            FhirsyncError::Persistence(format!("Failed to get connection from pool: {e}"))
        })
    }
}

#[async_trait]
impl RecordStore for PostgresStore {
    async fn upsert_patient(&self, record: &LocalPatientRecord) -> Result<LocalId> {
        let client = self.connection().await?;
        let address = record
            .address
            .as_ref()
            .map(serde_json::to_value)
            .transpose()?;

        let row = client
            .query_one(
                UPSERT_PATIENT,
                &[
                    &Uuid::new_v4(),
                    &record.tenant_id.as_str(),
                    &record.external_ref.source,
                    &record.external_ref.remote_id,
                    &record.first_name,
                    &record.last_name,
                    &record.email,
                    &record.phone,
                    &record.date_of_birth,
                    &record.gender,
                    &record.medical_record_number,
                    &address,
                ],
            )
            .await
            .map_err(|e| FhirsyncError::Persistence(format!("Patient upsert failed: {e}")))?;

        let id: Uuid = row.get(0);
        Ok(LocalId::new(id.to_string()))
    }

    async fn upsert_observation(&self, record: &LocalObservationRecord) -> Result<LocalId> {
        let patient_id = Uuid::parse_str(record.patient_id.as_str()).map_err(|e| {
            FhirsyncError::Persistence(format!(
                "Invalid local patient id '{}': {e}",
                record.patient_id
            ))
        })?;

        let client = self.connection().await?;
        let row = client
            .query_one(
                UPSERT_OBSERVATION,
                &[
                    &Uuid::new_v4(),
                    &patient_id,
                    &record.external_ref.source,
                    &record.external_ref.remote_id,
                    &record.observation_type,
                    &record.display,
                    &record.value,
                    &record.unit,
                    &record.observed_at,
                    &record.status,
                    &record.categories,
                ],
            )
            .await
            .map_err(|e| FhirsyncError::Persistence(format!("Observation upsert failed: {e}")))?;

        let id: Uuid = row.get(0);
        Ok(LocalId::new(id.to_string()))
    }

    fn backend_name(&self) -> &'static str {
        "postgresql"
    }
}
