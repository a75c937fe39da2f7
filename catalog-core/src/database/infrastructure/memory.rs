//! Process-local adapters for the catalog ports.
//!
//! Used by tests. Ids come from the same hi-lo allocator as PostgreSQL.

use std::collections::BTreeMap;

use async_trait::async_trait;
use catalog_model::{
    CatalogBrand, CatalogBrandId, CatalogItem, CatalogItemId, NewCatalogBrand,
    NewCatalogItem, PageRequest,
};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::cancellation::cancellable;
use crate::database::{
    hilo::{DEFAULT_HILO_BLOCK_SIZE, HiLoAllocator, InMemorySequence},
    ports::{catalog_brands::CatalogBrandRepository, catalog_items::CatalogItemRepository},
};
use crate::error::Result;

#[derive(Debug)]
pub struct InMemoryCatalogItemRepository {
    items: RwLock<BTreeMap<CatalogItemId, CatalogItem>>,
    ids: HiLoAllocator<InMemorySequence>,
}

impl Default for InMemoryCatalogItemRepository {
    fn default() -> Self {
        Self::new(DEFAULT_HILO_BLOCK_SIZE)
    }
}

impl InMemoryCatalogItemRepository {
    pub fn new(block_size: i64) -> Self {
        Self {
            items: RwLock::new(BTreeMap::new()),
            ids: HiLoAllocator::new(InMemorySequence::new(block_size), block_size),
        }
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}

#[async_trait]
impl CatalogItemRepository for InMemoryCatalogItemRepository {
    async fn get_all(
        &self,
        page: PageRequest,
        cancel: &CancellationToken,
    ) -> Result<Vec<CatalogItem>> {
        let items = cancellable(cancel, "memory.items.get_all", self.items.read()).await?;
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(page.limit()).unwrap_or(0);

        Ok(items.values().skip(offset).take(limit).cloned().collect())
    }

    async fn get_by_id(
        &self,
        id: CatalogItemId,
        cancel: &CancellationToken,
    ) -> Result<Option<CatalogItem>> {
        let items = cancellable(cancel, "memory.items.get_by_id", self.items.read()).await?;
        Ok(items.get(&id).cloned())
    }

    async fn add(
        &self,
        item: NewCatalogItem,
        cancel: &CancellationToken,
    ) -> Result<CatalogItem> {
        let id = CatalogItemId::new(self.ids.next_id(cancel).await?)?;
        let item = item.with_id(id);

        let mut items = cancellable(cancel, "memory.items.add", self.items.write()).await?;
        items.insert(id, item.clone());
        Ok(item)
    }

    async fn update(
        &self,
        item: CatalogItem,
        cancel: &CancellationToken,
    ) -> Result<Option<CatalogItem>> {
        let mut items = cancellable(cancel, "memory.items.update", self.items.write()).await?;
        match items.get_mut(&item.id) {
            Some(stored) => {
                *stored = item.clone();
                Ok(Some(item))
            }
            None => Ok(None),
        }
    }

    async fn remove(
        &self,
        id: CatalogItemId,
        cancel: &CancellationToken,
    ) -> Result<Option<CatalogItem>> {
        let mut items = cancellable(cancel, "memory.items.remove", self.items.write()).await?;
        Ok(items.remove(&id))
    }
}

#[derive(Debug)]
pub struct InMemoryCatalogBrandRepository {
    brands: RwLock<BTreeMap<CatalogBrandId, CatalogBrand>>,
    ids: HiLoAllocator<InMemorySequence>,
}

impl Default for InMemoryCatalogBrandRepository {
    fn default() -> Self {
        Self::new(DEFAULT_HILO_BLOCK_SIZE)
    }
}

impl InMemoryCatalogBrandRepository {
    pub fn new(block_size: i64) -> Self {
        Self {
            brands: RwLock::new(BTreeMap::new()),
            ids: HiLoAllocator::new(InMemorySequence::new(block_size), block_size),
        }
    }
}

#[async_trait]
impl CatalogBrandRepository for InMemoryCatalogBrandRepository {
    async fn list(&self, cancel: &CancellationToken) -> Result<Vec<CatalogBrand>> {
        let brands = cancellable(cancel, "memory.brands.list", self.brands.read()).await?;
        Ok(brands.values().cloned().collect())
    }

    async fn get_by_id(
        &self,
        id: CatalogBrandId,
        cancel: &CancellationToken,
    ) -> Result<Option<CatalogBrand>> {
        let brands = cancellable(cancel, "memory.brands.get_by_id", self.brands.read()).await?;
        Ok(brands.get(&id).cloned())
    }

    async fn get_many(
        &self,
        ids: &[CatalogBrandId],
        cancel: &CancellationToken,
    ) -> Result<Vec<CatalogBrand>> {
        let brands = cancellable(cancel, "memory.brands.get_many", self.brands.read()).await?;
        let mut found: Vec<CatalogBrand> = ids
            .iter()
            .filter_map(|id| brands.get(id).cloned())
            .collect();
        found.sort_by_key(|brand| brand.id);
        found.dedup_by_key(|brand| brand.id);
        Ok(found)
    }

    async fn add(
        &self,
        brand: NewCatalogBrand,
        cancel: &CancellationToken,
    ) -> Result<CatalogBrand> {
        let id = CatalogBrandId::new(self.ids.next_id(cancel).await?)?;
        let brand = brand.with_id(id);

        let mut brands = cancellable(cancel, "memory.brands.add", self.brands.write()).await?;
        brands.insert(id, brand.clone());
        Ok(brand)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_model::{CreateCatalogItemDto, Decimal};

    fn widget(name: &str) -> NewCatalogItem {
        NewCatalogItem::from_dto(CreateCatalogItemDto {
            name: name.to_string(),
            description: None,
            price: Decimal::new(999, 2),
            picture_file_name: None,
            catalog_brand_id: None,
            available_stock: 0,
            restock_threshold: 0,
            max_stock_threshold: 0,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn pages_are_ordered_by_id() {
        let repo = InMemoryCatalogItemRepository::default();
        let cancel = CancellationToken::new();
        for n in 0..5 {
            repo.add(widget(&format!("item {n}")), &cancel).await.unwrap();
        }

        let second = repo
            .get_all(PageRequest::new(2, 1).unwrap(), &cancel)
            .await
            .unwrap();
        let names: Vec<_> = second.iter().map(|item| item.name.as_str()).collect();
        assert_eq!(names, ["item 2", "item 3"]);

        let past_end = repo
            .get_all(PageRequest::new(10, 3).unwrap(), &cancel)
            .await
            .unwrap();
        assert!(past_end.is_empty());
    }

    #[tokio::test]
    async fn update_of_missing_row_is_none() {
        let repo = InMemoryCatalogItemRepository::default();
        let cancel = CancellationToken::new();
        let ghost = widget("ghost").with_id(CatalogItemId::new(42).unwrap());

        assert!(repo.update(ghost, &cancel).await.unwrap().is_none());
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn remove_returns_the_deleted_row_once() {
        let repo = InMemoryCatalogItemRepository::default();
        let cancel = CancellationToken::new();
        let created = repo.add(widget("gone"), &cancel).await.unwrap();

        assert_eq!(repo.remove(created.id, &cancel).await.unwrap(), Some(created.clone()));
        assert_eq!(repo.remove(created.id, &cancel).await.unwrap(), None);
    }

    #[tokio::test]
    async fn get_many_skips_unknown_brands() {
        let repo = InMemoryCatalogBrandRepository::default();
        let cancel = CancellationToken::new();
        let acme = repo
            .add(NewCatalogBrand::new("Acme").unwrap(), &cancel)
            .await
            .unwrap();
        let unknown = CatalogBrandId::new(999).unwrap();

        let found = repo
            .get_many(&[unknown, acme.id, acme.id], &cancel)
            .await
            .unwrap();
        assert_eq!(found, vec![acme]);
    }

    #[tokio::test]
    async fn cancelled_token_short_circuits_reads() {
        let repo = InMemoryCatalogBrandRepository::default();
        let cancel = CancellationToken::new();
        cancel.cancel();

        assert!(repo.list(&cancel).await.unwrap_err().is_cancelled());
    }
}
