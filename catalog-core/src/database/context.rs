use std::fmt;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::application::unit_of_work::CatalogUnitOfWork;
use crate::database::{PostgresDatabase, PostgresOptions, RetryPolicy};
use crate::error::Result;

/// Bundles the Postgres handle with the unit of work built on top of it.
#[derive(Clone)]
pub struct DatabaseContext {
    postgres: Arc<PostgresDatabase>,
    unit_of_work: Arc<CatalogUnitOfWork>,
}

impl fmt::Debug for DatabaseContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseContext")
            .field("postgres", &self.postgres)
            .field("unit_of_work", &self.unit_of_work)
            .finish()
    }
}

impl DatabaseContext {
    /// Connect, make sure the schema exists, and compose the unit of work.
    pub async fn connect_postgres(
        connection_string: &str,
        options: PostgresOptions,
        retry: RetryPolicy,
        hilo_block_size: i64,
        cancel: &CancellationToken,
    ) -> Result<Self> {
        let postgres =
            PostgresDatabase::connect(connection_string, options, retry, cancel).await?;
        postgres.ensure_schema(hilo_block_size, cancel).await?;
        Self::from_postgres(Arc::new(postgres), hilo_block_size, cancel).await
    }

    pub async fn from_postgres(
        postgres: Arc<PostgresDatabase>,
        hilo_block_size: i64,
        cancel: &CancellationToken,
    ) -> Result<Self> {
        let unit_of_work = Arc::new(
            CatalogUnitOfWork::from_postgres(&postgres, hilo_block_size, cancel).await?,
        );

        Ok(Self {
            postgres,
            unit_of_work,
        })
    }

    pub fn unit_of_work(&self) -> Arc<CatalogUnitOfWork> {
        Arc::clone(&self.unit_of_work)
    }

    pub fn postgres(&self) -> Arc<PostgresDatabase> {
        Arc::clone(&self.postgres)
    }
}
