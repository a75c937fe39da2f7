use std::sync::Arc;

use async_trait::async_trait;
use catalog_model::{
    CatalogBrandId, CatalogItem, CatalogItemId, Decimal, NewCatalogItem, PageRequest,
};
use sqlx::{Row, postgres::PgRow};
use tokio_util::sync::CancellationToken;

use super::sequence::PostgresSequence;
use crate::database::{
    hilo::HiLoAllocator, ports::catalog_items::CatalogItemRepository,
    postgres::PostgresDatabase,
};
use crate::error::{CatalogError, Result};

const ITEM_COLUMNS: &str = "id, name, description, price, picture_file_name, \
     catalog_brand_id, available_stock, restock_threshold, max_stock_threshold";

#[derive(Debug, Clone)]
pub struct PostgresCatalogItemRepository {
    db: PostgresDatabase,
    ids: Arc<HiLoAllocator<PostgresSequence>>,
}

impl PostgresCatalogItemRepository {
    pub fn new(db: PostgresDatabase, ids: Arc<HiLoAllocator<PostgresSequence>>) -> Self {
        Self { db, ids }
    }

    fn map_row(row: &PgRow) -> Result<CatalogItem> {
        let id: i64 = row
            .try_get("id")
            .map_err(|e| CatalogError::Database(format!("Failed to read item id: {e}")))?;
        let name: String = row
            .try_get("name")
            .map_err(|e| CatalogError::Database(format!("Failed to read item name: {e}")))?;
        let description: Option<String> = row.try_get("description").map_err(|e| {
            CatalogError::Database(format!("Failed to read item description: {e}"))
        })?;
        let price: Decimal = row
            .try_get("price")
            .map_err(|e| CatalogError::Database(format!("Failed to read item price: {e}")))?;
        let picture_file_name: Option<String> =
            row.try_get("picture_file_name").map_err(|e| {
                CatalogError::Database(format!("Failed to read picture_file_name: {e}"))
            })?;
        let catalog_brand_id: Option<i64> = row.try_get("catalog_brand_id").map_err(|e| {
            CatalogError::Database(format!("Failed to read catalog_brand_id: {e}"))
        })?;
        let available_stock: i32 = row.try_get("available_stock").map_err(|e| {
            CatalogError::Database(format!("Failed to read available_stock: {e}"))
        })?;
        let restock_threshold: i32 = row.try_get("restock_threshold").map_err(|e| {
            CatalogError::Database(format!("Failed to read restock_threshold: {e}"))
        })?;
        let max_stock_threshold: i32 = row.try_get("max_stock_threshold").map_err(|e| {
            CatalogError::Database(format!("Failed to read max_stock_threshold: {e}"))
        })?;

        let id = CatalogItemId::new(id)
            .map_err(|e| CatalogError::Internal(format!("Stored item has {e}")))?;
        let catalog_brand_id = catalog_brand_id
            .map(CatalogBrandId::new)
            .transpose()
            .map_err(|e| CatalogError::Internal(format!("Stored item {id} has {e}")))?;

        Ok(CatalogItem {
            id,
            name,
            description,
            price,
            picture_file_name,
            catalog_brand_id,
            available_stock,
            restock_threshold,
            max_stock_threshold,
        })
    }
}

#[async_trait]
impl CatalogItemRepository for PostgresCatalogItemRepository {
    async fn get_all(
        &self,
        page: PageRequest,
        cancel: &CancellationToken,
    ) -> Result<Vec<CatalogItem>> {
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM catalog_item ORDER BY id LIMIT $1 OFFSET $2"
        );
        let rows = self
            .db
            .run("catalog_items.get_all", cancel, |pool| {
                let sql = sql.clone();
                async move {
                    sqlx::query(&sql)
                        .bind(page.limit())
                        .bind(page.offset())
                        .fetch_all(&pool)
                        .await
                }
            })
            .await?;

        rows.iter().map(Self::map_row).collect()
    }

    async fn get_by_id(
        &self,
        id: CatalogItemId,
        cancel: &CancellationToken,
    ) -> Result<Option<CatalogItem>> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM catalog_item WHERE id = $1");
        let row = self
            .db
            .run("catalog_items.get_by_id", cancel, |pool| {
                let sql = sql.clone();
                async move { sqlx::query(&sql).bind(id.get()).fetch_optional(&pool).await }
            })
            .await?;

        row.as_ref().map(Self::map_row).transpose()
    }

    async fn add(
        &self,
        item: NewCatalogItem,
        cancel: &CancellationToken,
    ) -> Result<CatalogItem> {
        let id = CatalogItemId::new(self.ids.next_id(cancel).await?)?;
        let item = item.with_id(id);

        // The id is fixed before the first attempt, so a replay after a lost
        // commit finds its own row instead of tripping the primary key.
        let sql = format!(
            "WITH inserted AS ( \
                 INSERT INTO catalog_item ({ITEM_COLUMNS}) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
                 ON CONFLICT (id) DO NOTHING \
                 RETURNING {ITEM_COLUMNS} \
             ) \
             SELECT {ITEM_COLUMNS} FROM inserted \
             UNION ALL \
             SELECT {ITEM_COLUMNS} FROM catalog_item WHERE id = $1 \
             LIMIT 1"
        );
        let row = self
            .db
            .run("catalog_items.add", cancel, |pool| {
                let sql = sql.clone();
                let item = item.clone();
                async move {
                    sqlx::query(&sql)
                        .bind(item.id.get())
                        .bind(item.name)
                        .bind(item.description)
                        .bind(item.price)
                        .bind(item.picture_file_name)
                        .bind(item.catalog_brand_id.map(CatalogBrandId::get))
                        .bind(item.available_stock)
                        .bind(item.restock_threshold)
                        .bind(item.max_stock_threshold)
                        .fetch_one(&pool)
                        .await
                }
            })
            .await?;

        Self::map_row(&row)
    }

    async fn update(
        &self,
        item: CatalogItem,
        cancel: &CancellationToken,
    ) -> Result<Option<CatalogItem>> {
        let sql = format!(
            "UPDATE catalog_item SET \
                 name = $2, description = $3, price = $4, picture_file_name = $5, \
                 catalog_brand_id = $6, available_stock = $7, restock_threshold = $8, \
                 max_stock_threshold = $9 \
             WHERE id = $1 \
             RETURNING {ITEM_COLUMNS}"
        );
        let row = self
            .db
            .run("catalog_items.update", cancel, |pool| {
                let sql = sql.clone();
                let item = item.clone();
                async move {
                    sqlx::query(&sql)
                        .bind(item.id.get())
                        .bind(item.name)
                        .bind(item.description)
                        .bind(item.price)
                        .bind(item.picture_file_name)
                        .bind(item.catalog_brand_id.map(CatalogBrandId::get))
                        .bind(item.available_stock)
                        .bind(item.restock_threshold)
                        .bind(item.max_stock_threshold)
                        .fetch_optional(&pool)
                        .await
                }
            })
            .await?;

        row.as_ref().map(Self::map_row).transpose()
    }

    async fn remove(
        &self,
        id: CatalogItemId,
        cancel: &CancellationToken,
    ) -> Result<Option<CatalogItem>> {
        let sql = format!("DELETE FROM catalog_item WHERE id = $1 RETURNING {ITEM_COLUMNS}");
        let row = self
            .db
            .run("catalog_items.remove", cancel, |pool| {
                let sql = sql.clone();
                async move { sqlx::query(&sql).bind(id.get()).fetch_optional(&pool).await }
            })
            .await?;

        row.as_ref().map(Self::map_row).transpose()
    }
}
