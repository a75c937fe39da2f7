use std::sync::Arc;

use async_trait::async_trait;
use catalog_model::{CatalogBrand, CatalogBrandId, NewCatalogBrand};
use sqlx::{Row, postgres::PgRow};
use tokio_util::sync::CancellationToken;

use super::sequence::PostgresSequence;
use crate::database::{
    hilo::HiLoAllocator, ports::catalog_brands::CatalogBrandRepository,
    postgres::PostgresDatabase,
};
use crate::error::{CatalogError, Result};

// Replaying the insert for an id that already committed returns the stored row.
const ADD_BRAND_SQL: &str = "WITH inserted AS ( \
         INSERT INTO catalog_brand (id, brand) VALUES ($1, $2) \
         ON CONFLICT (id) DO NOTHING \
         RETURNING id, brand \
     ) \
     SELECT id, brand FROM inserted \
     UNION ALL \
     SELECT id, brand FROM catalog_brand WHERE id = $1 \
     LIMIT 1";

#[derive(Debug, Clone)]
pub struct PostgresCatalogBrandRepository {
    db: PostgresDatabase,
    ids: Arc<HiLoAllocator<PostgresSequence>>,
}

impl PostgresCatalogBrandRepository {
    pub fn new(db: PostgresDatabase, ids: Arc<HiLoAllocator<PostgresSequence>>) -> Self {
        Self { db, ids }
    }

    fn map_row(row: &PgRow) -> Result<CatalogBrand> {
        let id: i64 = row
            .try_get("id")
            .map_err(|e| CatalogError::Database(format!("Failed to read brand id: {e}")))?;
        let brand: String = row
            .try_get("brand")
            .map_err(|e| CatalogError::Database(format!("Failed to read brand name: {e}")))?;

        let id = CatalogBrandId::new(id)
            .map_err(|e| CatalogError::Internal(format!("Stored brand has {e}")))?;
        Ok(CatalogBrand { id, brand })
    }
}

#[async_trait]
impl CatalogBrandRepository for PostgresCatalogBrandRepository {
    async fn list(&self, cancel: &CancellationToken) -> Result<Vec<CatalogBrand>> {
        let rows = self
            .db
            .run("catalog_brands.list", cancel, |pool| async move {
                sqlx::query("SELECT id, brand FROM catalog_brand ORDER BY id")
                    .fetch_all(&pool)
                    .await
            })
            .await?;

        rows.iter().map(Self::map_row).collect()
    }

    async fn get_by_id(
        &self,
        id: CatalogBrandId,
        cancel: &CancellationToken,
    ) -> Result<Option<CatalogBrand>> {
        let row = self
            .db
            .run("catalog_brands.get_by_id", cancel, move |pool| async move {
                sqlx::query("SELECT id, brand FROM catalog_brand WHERE id = $1")
                    .bind(id.get())
                    .fetch_optional(&pool)
                    .await
            })
            .await?;

        row.as_ref().map(Self::map_row).transpose()
    }

    async fn get_many(
        &self,
        ids: &[CatalogBrandId],
        cancel: &CancellationToken,
    ) -> Result<Vec<CatalogBrand>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let raw: Vec<i64> = ids.iter().map(|id| id.get()).collect();
        let rows = self
            .db
            .run("catalog_brands.get_many", cancel, |pool| {
                let raw = raw.clone();
                async move {
                    sqlx::query(
                        "SELECT id, brand FROM catalog_brand WHERE id = ANY($1) ORDER BY id",
                    )
                    .bind(raw)
                    .fetch_all(&pool)
                    .await
                }
            })
            .await?;

        rows.iter().map(Self::map_row).collect()
    }

    async fn add(
        &self,
        brand: NewCatalogBrand,
        cancel: &CancellationToken,
    ) -> Result<CatalogBrand> {
        let id = CatalogBrandId::new(self.ids.next_id(cancel).await?)?;
        let brand = brand.with_id(id);

        let row = self
            .db
            .run("catalog_brands.add", cancel, |pool| {
                let name = brand.brand.clone();
                async move {
                    sqlx::query(ADD_BRAND_SQL)
                    .bind(id.get())
                    .bind(name)
                    .fetch_one(&pool)
                    .await
                }
            })
            .await?;

        Self::map_row(&row)
    }
}
