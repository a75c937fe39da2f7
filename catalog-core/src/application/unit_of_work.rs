use std::any::type_name_of_val;
use std::fmt;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::database::{
    hilo::{CATALOG_BRAND_HILO, CATALOG_ITEM_HILO, DEFAULT_HILO_BLOCK_SIZE, HiLoAllocator},
    infrastructure::{
        memory::{InMemoryCatalogBrandRepository, InMemoryCatalogItemRepository},
        postgres::{
            PostgresCatalogBrandRepository, PostgresCatalogItemRepository, PostgresSequence,
        },
    },
    ports::{catalog_brands::CatalogBrandRepository, catalog_items::CatalogItemRepository},
    postgres::PostgresDatabase,
};
use crate::error::Result;

/// Repository ports the catalog handlers work against.
#[derive(Clone)]
pub struct CatalogUnitOfWork {
    pub items: Arc<dyn CatalogItemRepository>,
    pub brands: Arc<dyn CatalogBrandRepository>,
}

impl fmt::Debug for CatalogUnitOfWork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogUnitOfWork")
            .field("items", &type_name_of_val(self.items.as_ref()))
            .field("brands", &type_name_of_val(self.brands.as_ref()))
            .finish()
    }
}

impl CatalogUnitOfWork {
    pub fn new(
        items: Arc<dyn CatalogItemRepository>,
        brands: Arc<dyn CatalogBrandRepository>,
    ) -> Self {
        Self { items, brands }
    }

    /// Build the PostgreSQL-backed repositories. Block sizes are read back
    /// from the hi-lo sequences so every process agrees on them.
    pub async fn from_postgres(
        postgres: &PostgresDatabase,
        hilo_block_size: i64,
        cancel: &CancellationToken,
    ) -> Result<Self> {
        let item_block = postgres
            .resolve_hilo_block_size(CATALOG_ITEM_HILO, hilo_block_size, cancel)
            .await?;
        let brand_block = postgres
            .resolve_hilo_block_size(CATALOG_BRAND_HILO, hilo_block_size, cancel)
            .await?;

        let item_ids = Arc::new(HiLoAllocator::new(
            PostgresSequence::new(postgres.clone(), CATALOG_ITEM_HILO),
            item_block,
        ));
        let brand_ids = Arc::new(HiLoAllocator::new(
            PostgresSequence::new(postgres.clone(), CATALOG_BRAND_HILO),
            brand_block,
        ));

        Ok(Self {
            items: Arc::new(PostgresCatalogItemRepository::new(postgres.clone(), item_ids)),
            brands: Arc::new(PostgresCatalogBrandRepository::new(
                postgres.clone(),
                brand_ids,
            )),
        })
    }

    pub fn in_memory() -> Self {
        Self::in_memory_with_block_size(DEFAULT_HILO_BLOCK_SIZE)
    }

    pub fn in_memory_with_block_size(block_size: i64) -> Self {
        Self {
            items: Arc::new(InMemoryCatalogItemRepository::new(block_size)),
            brands: Arc::new(InMemoryCatalogBrandRepository::new(block_size)),
        }
    }
}
