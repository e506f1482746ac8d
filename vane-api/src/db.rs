//! PostgreSQL Record Store
//!
//! This module provides the production [`RecordStore`] backed by
//! PostgreSQL, using deadpool-postgres for connection pooling. The
//! schema is a single `locations` table; ids are UUIDv7 assigned
//! application-side so `ORDER BY id` is creation order.

use async_trait::async_trait;
use deadpool_postgres::{Config, ManagerConfig, Pool, PoolConfig, RecyclingMethod, Runtime};
use std::time::Duration;
use tokio_postgres::{NoTls, Row};

use vane_core::{Location, LocationFields, LocationId, VaneError, VaneResult};
use vane_storage::RecordStore;

use crate::error::{ApiError, ApiResult};

// ============================================================================
// CONNECTION POOL CONFIGURATION
// ============================================================================

/// Database connection pool configuration.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// PostgreSQL host
    pub host: String,
    /// PostgreSQL port
    pub port: u16,
    /// Database name
    pub dbname: String,
    /// Database user
    pub user: String,
    /// Database password
    pub password: String,
    /// Maximum pool size
    pub max_size: usize,
    /// Connection timeout
    pub timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            dbname: "vane".to_string(),
            user: "postgres".to_string(),
            password: "".to_string(),
            max_size: 16,
            timeout: Duration::from_secs(30),
        }
    }
}

impl DbConfig {
    /// Create a new database configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("VANE_DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("VANE_DB_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5432),
            dbname: std::env::var("VANE_DB_NAME").unwrap_or_else(|_| "vane".to_string()),
            user: std::env::var("VANE_DB_USER").unwrap_or_else(|_| "postgres".to_string()),
            password: std::env::var("VANE_DB_PASSWORD").unwrap_or_default(),
            max_size: std::env::var("VANE_DB_POOL_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(16),
            timeout: Duration::from_secs(
                std::env::var("VANE_DB_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        }
    }

    /// Create a connection pool from this configuration.
    pub fn create_pool(&self) -> ApiResult<Pool> {
        let mut cfg = Config::new();
        cfg.host = Some(self.host.clone());
        cfg.port = Some(self.port);
        cfg.dbname = Some(self.dbname.clone());
        cfg.user = Some(self.user.clone());
        cfg.password = Some(self.password.clone());
        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });

        let mut pool_config = PoolConfig::new(self.max_size);
        pool_config.timeouts.wait = Some(self.timeout);
        cfg.pool = Some(pool_config);

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| ApiError::database_error(format!("Failed to create pool: {}", e)))?;

        Ok(pool)
    }
}

// ============================================================================
// SCHEMA
// ============================================================================

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS locations (
    id          UUID PRIMARY KEY,
    name        TEXT NOT NULL,
    latitude    DOUBLE PRECISION NOT NULL,
    longitude   DOUBLE PRECISION NOT NULL,
    created_at  TIMESTAMPTZ NOT NULL,
    updated_at  TIMESTAMPTZ NOT NULL
);
";

const COLUMNS: &str = "id, name, latitude, longitude, created_at, updated_at";

// ============================================================================
// POSTGRES RECORD STORE
// ============================================================================

/// PostgreSQL-backed [`RecordStore`].
#[derive(Clone)]
pub struct PgRecordStore {
    pool: Pool,
}

impl PgRecordStore {
    /// Create a new record store with the given pool.
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Create a new record store from configuration.
    pub fn from_config(config: &DbConfig) -> ApiResult<Self> {
        let pool = config.create_pool()?;
        Ok(Self::new(pool))
    }

    /// Get the current pool size for observability.
    pub fn pool_size(&self) -> usize {
        let status = self.pool.status();
        status.size
    }

    /// Create the `locations` table if it does not exist yet.
    pub async fn init_schema(&self) -> VaneResult<()> {
        let conn = self.conn().await?;
        conn.batch_execute(SCHEMA).await.map_err(store_err)?;
        Ok(())
    }

    /// Get a connection from the pool.
    async fn conn(&self) -> VaneResult<deadpool_postgres::Object> {
        self.pool.get().await.map_err(|e| {
            tracing::error!("Connection pool error: {:?}", e);
            VaneError::store(e.to_string())
        })
    }
}

/// Map a Postgres error into the domain error, logging the full cause.
/// The API layer replaces store errors with a generic message before
/// they reach a client.
fn store_err(err: tokio_postgres::Error) -> VaneError {
    tracing::error!("Database error: {:?}", err);
    VaneError::store(err.to_string())
}

/// Convert a row from the `locations` table into a [`Location`].
fn row_to_location(row: &Row) -> Location {
    Location {
        id: row.get("id"),
        name: row.get("name"),
        latitude: row.get("latitude"),
        longitude: row.get("longitude"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn find_all(&self) -> VaneResult<Vec<Location>> {
        let conn = self.conn().await?;
        let sql = format!("SELECT {} FROM locations ORDER BY id", COLUMNS);
        let rows = conn.query(sql.as_str(), &[]).await.map_err(store_err)?;

        Ok(rows.iter().map(row_to_location).collect())
    }

    async fn find_by_id(&self, id: LocationId) -> VaneResult<Option<Location>> {
        let conn = self.conn().await?;
        let sql = format!("SELECT {} FROM locations WHERE id = $1", COLUMNS);
        let row = conn
            .query_opt(sql.as_str(), &[&id])
            .await
            .map_err(store_err)?;

        Ok(row.as_ref().map(row_to_location))
    }

    async fn create(&self, fields: LocationFields) -> VaneResult<Location> {
        let location = Location::new(fields.name, fields.latitude, fields.longitude);

        let conn = self.conn().await?;
        conn.execute(
            "INSERT INTO locations (id, name, latitude, longitude, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
            &[
                &location.id,
                &location.name,
                &location.latitude,
                &location.longitude,
                &location.created_at,
                &location.updated_at,
            ],
        )
        .await
        .map_err(store_err)?;

        Ok(location)
    }

    async fn update_by_id(
        &self,
        id: LocationId,
        fields: LocationFields,
    ) -> VaneResult<Option<Location>> {
        let conn = self.conn().await?;
        let sql = format!(
            "UPDATE locations \
             SET name = $2, latitude = $3, longitude = $4, updated_at = now() \
             WHERE id = $1 RETURNING {}",
            COLUMNS
        );
        let row = conn
            .query_opt(
                sql.as_str(),
                &[&id, &fields.name, &fields.latitude, &fields.longitude],
            )
            .await
            .map_err(store_err)?;

        Ok(row.as_ref().map(row_to_location))
    }

    async fn delete_by_id(&self, id: LocationId) -> VaneResult<bool> {
        let conn = self.conn().await?;
        let deleted = conn
            .execute("DELETE FROM locations WHERE id = $1", &[&id])
            .await
            .map_err(store_err)?;

        Ok(deleted > 0)
    }

    async fn ping(&self) -> VaneResult<()> {
        let conn = self.conn().await?;
        conn.query_one("SELECT 1", &[]).await.map_err(store_err)?;
        Ok(())
    }
}
