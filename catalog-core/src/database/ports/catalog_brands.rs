use async_trait::async_trait;
use catalog_model::{CatalogBrand, CatalogBrandId, NewCatalogBrand};
use tokio_util::sync::CancellationToken;

use crate::error::Result;

#[async_trait]
pub trait CatalogBrandRepository: Send + Sync {
    /// All brands ordered by id.
    async fn list(&self, cancel: &CancellationToken) -> Result<Vec<CatalogBrand>>;

    async fn get_by_id(
        &self,
        id: CatalogBrandId,
        cancel: &CancellationToken,
    ) -> Result<Option<CatalogBrand>>;

    /// Brands for a set of ids; unknown ids are skipped.
    async fn get_many(
        &self,
        ids: &[CatalogBrandId],
        cancel: &CancellationToken,
    ) -> Result<Vec<CatalogBrand>>;

    async fn add(
        &self,
        brand: NewCatalogBrand,
        cancel: &CancellationToken,
    ) -> Result<CatalogBrand>;
}
