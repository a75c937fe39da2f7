use async_trait::async_trait;
use sqlx::Row;
use tokio_util::sync::CancellationToken;

use crate::database::{hilo::HiLoSource, postgres::PostgresDatabase};
use crate::error::{CatalogError, Result};

/// A PostgreSQL sequence whose `INCREMENT BY` equals the allocator block
/// size; each `nextval` reserves one block.
#[derive(Debug, Clone)]
pub struct PostgresSequence {
    db: PostgresDatabase,
    name: &'static str,
}

impl PostgresSequence {
    pub fn new(db: PostgresDatabase, name: &'static str) -> Self {
        Self { db, name }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

#[async_trait]
impl HiLoSource for PostgresSequence {
    async fn next_hi(&self, cancel: &CancellationToken) -> Result<i64> {
        let name = self.name;
        let row = self
            .db
            .run("hilo.nextval", cancel, move |pool| async move {
                sqlx::query("SELECT nextval($1::text::regclass) AS hi")
                    .bind(name)
                    .fetch_one(&pool)
                    .await
            })
            .await?;

        row.try_get::<i64, _>("hi").map_err(|e| {
            CatalogError::Database(format!("Failed to read nextval of {name}: {e}"))
        })
    }
}
