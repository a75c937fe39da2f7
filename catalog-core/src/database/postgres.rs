use std::{fmt, future::Future, str::FromStr, time::Duration};

use sqlx::{
    PgPool, Row,
    postgres::{PgConnectOptions, PgPoolOptions},
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::{
    hilo::{CATALOG_BRAND_HILO, CATALOG_ITEM_HILO},
    retry::RetryPolicy,
};
use crate::error::{CatalogError, Result};

/// Pool sizing for [`PostgresDatabase::connect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostgresOptions {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
}

impl Default for PostgresOptions {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(30),
        }
    }
}

/// Shared PostgreSQL handle: the pool plus the retry policy every statement
/// runs under.
#[derive(Clone)]
pub struct PostgresDatabase {
    pool: PgPool,
    retry: RetryPolicy,
}

impl fmt::Debug for PostgresDatabase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresDatabase")
            .field("pool_size", &self.pool.size())
            .field("idle_connections", &self.pool.num_idle())
            .field("retry", &self.retry)
            .finish()
    }
}

impl PostgresDatabase {
    /// Open the pool, retrying transient failures according to `retry`.
    pub async fn connect(
        connection_string: &str,
        options: PostgresOptions,
        retry: RetryPolicy,
        cancel: &CancellationToken,
    ) -> Result<Self> {
        let connect_options = PgConnectOptions::from_str(connection_string)
            .map_err(|e| {
                CatalogError::Configuration(format!("Invalid database URL: {e}"))
            })?;

        let pool_options = PgPoolOptions::new()
            .max_connections(options.max_connections)
            .min_connections(options.min_connections)
            .acquire_timeout(options.acquire_timeout)
            .test_before_acquire(true);

        let pool = retry
            .execute("postgres.connect", cancel, || {
                pool_options.clone().connect_with(connect_options.clone())
            })
            .await?;

        info!(
            max_connections = options.max_connections,
            min_connections = options.min_connections,
            "Database pool initialized"
        );

        Ok(Self { pool, retry })
    }

    /// Wrap an existing pool (tests, tooling).
    pub fn from_pool(pool: PgPool, retry: RetryPolicy) -> Self {
        Self { pool, retry }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Run one statement under the retry policy. `attempt` receives a pool
    /// handle per try.
    pub(crate) async fn run<T, F, Fut>(
        &self,
        operation: &'static str,
        cancel: &CancellationToken,
        mut attempt: F,
    ) -> Result<T>
    where
        F: FnMut(PgPool) -> Fut,
        Fut: Future<Output = std::result::Result<T, sqlx::Error>>,
    {
        let pool = &self.pool;
        self.retry
            .execute(operation, cancel, || attempt(pool.clone()))
            .await
    }

    pub async fn ping(&self, cancel: &CancellationToken) -> Result<()> {
        self.run("postgres.ping", cancel, |pool| async move {
            sqlx::query("SELECT 1").execute(&pool).await
        })
        .await?;
        Ok(())
    }

    /// Create the catalog tables and hi-lo sequences when they are missing.
    /// Existing objects are left untouched, including a sequence created
    /// with a different increment.
    pub async fn ensure_schema(
        &self,
        hilo_block_size: i64,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let script = schema_script(hilo_block_size.max(1));
        self.run("postgres.ensure_schema", cancel, |pool| {
            let script = script.clone();
            async move { sqlx::raw_sql(&script).execute(&pool).await }
        })
        .await?;

        info!(hilo_block_size, "Catalog schema verified");
        Ok(())
    }

    /// Increment of a hi-lo sequence, which is the block size its allocator
    /// must use.
    pub async fn hilo_increment(
        &self,
        sequence: &'static str,
        cancel: &CancellationToken,
    ) -> Result<i64> {
        let row = self
            .run("postgres.hilo_increment", cancel, move |pool| async move {
                sqlx::query(
                    "SELECT increment_by FROM pg_sequences WHERE sequencename = $1",
                )
                .bind(sequence)
                .fetch_optional(&pool)
                .await
            })
            .await?;

        let row = row.ok_or_else(|| {
            CatalogError::Configuration(format!(
                "Sequence {sequence} does not exist; run `catalog-server db init`"
            ))
        })?;

        row.try_get::<i64, _>("increment_by").map_err(|e| {
            CatalogError::Database(format!("Failed to read increment of {sequence}: {e}"))
        })
    }

    /// Resolve the block size for `sequence`, preferring what the database
    /// was created with over the configured value.
    pub async fn resolve_hilo_block_size(
        &self,
        sequence: &'static str,
        configured: i64,
        cancel: &CancellationToken,
    ) -> Result<i64> {
        let actual = self.hilo_increment(sequence, cancel).await?;
        if actual != configured {
            warn!(
                sequence,
                configured,
                actual,
                "hi-lo sequence increment differs from configuration; using the database value"
            );
        }
        Ok(actual.max(1))
    }
}

fn schema_script(block_size: i64) -> String {
    format!(
        r#"
        CREATE SEQUENCE IF NOT EXISTS {CATALOG_BRAND_HILO} START WITH 1 INCREMENT BY {block_size};
        CREATE SEQUENCE IF NOT EXISTS {CATALOG_ITEM_HILO} START WITH 1 INCREMENT BY {block_size};

        CREATE TABLE IF NOT EXISTS catalog_brand (
            id    BIGINT PRIMARY KEY,
            brand VARCHAR(100) NOT NULL
        );

        CREATE TABLE IF NOT EXISTS catalog_item (
            id                  BIGINT PRIMARY KEY,
            name                VARCHAR(50) NOT NULL,
            description         TEXT,
            price               NUMERIC(18, 2) NOT NULL CHECK (price >= 0),
            picture_file_name   TEXT,
            catalog_brand_id    BIGINT REFERENCES catalog_brand (id),
            available_stock     INTEGER NOT NULL DEFAULT 0 CHECK (available_stock >= 0),
            restock_threshold   INTEGER NOT NULL DEFAULT 0 CHECK (restock_threshold >= 0),
            max_stock_threshold INTEGER NOT NULL DEFAULT 0 CHECK (max_stock_threshold >= 0)
        );

        CREATE INDEX IF NOT EXISTS idx_catalog_item_brand ON catalog_item (catalog_brand_id);
        "#
    )
}
