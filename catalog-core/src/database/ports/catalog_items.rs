use async_trait::async_trait;
use catalog_model::{CatalogItem, CatalogItemId, NewCatalogItem, PageRequest};
use tokio_util::sync::CancellationToken;

use crate::error::Result;

#[async_trait]
pub trait CatalogItemRepository: Send + Sync {
    /// One page of items ordered by id.
    async fn get_all(
        &self,
        page: PageRequest,
        cancel: &CancellationToken,
    ) -> Result<Vec<CatalogItem>>;

    async fn get_by_id(
        &self,
        id: CatalogItemId,
        cancel: &CancellationToken,
    ) -> Result<Option<CatalogItem>>;

    /// Persist a new item; the store assigns its identifier. Retried attempts
    /// reuse that identifier, so at most one row is written.
    async fn add(
        &self,
        item: NewCatalogItem,
        cancel: &CancellationToken,
    ) -> Result<CatalogItem>;

    /// Overwrite every column of an existing row. Returns `None` when the row
    /// vanished between read and write.
    async fn update(
        &self,
        item: CatalogItem,
        cancel: &CancellationToken,
    ) -> Result<Option<CatalogItem>>;

    async fn remove(
        &self,
        id: CatalogItemId,
        cancel: &CancellationToken,
    ) -> Result<Option<CatalogItem>>;
}
