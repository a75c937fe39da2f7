use async_trait::async_trait;
use catalog_model::{CatalogBrandViewModel, NewCatalogBrand};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::application::{
    commands::CreateCatalogBrandCommand, queries::ReadCatalogBrandsQuery,
    unit_of_work::CatalogUnitOfWork,
};
use crate::error::Result;
use crate::mediator::RequestHandler;

#[derive(Debug, Clone)]
pub struct ReadCatalogBrandsHandler {
    uow: CatalogUnitOfWork,
}

impl ReadCatalogBrandsHandler {
    pub fn new(uow: CatalogUnitOfWork) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl RequestHandler<ReadCatalogBrandsQuery> for ReadCatalogBrandsHandler {
    async fn handle(
        &self,
        _request: ReadCatalogBrandsQuery,
        cancel: &CancellationToken,
    ) -> Result<Vec<CatalogBrandViewModel>> {
        let brands = self.uow.brands.list(cancel).await?;
        Ok(brands.into_iter().map(CatalogBrandViewModel::from).collect())
    }
}

#[derive(Debug, Clone)]
pub struct CreateCatalogBrandHandler {
    uow: CatalogUnitOfWork,
}

impl CreateCatalogBrandHandler {
    pub fn new(uow: CatalogUnitOfWork) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl RequestHandler<CreateCatalogBrandCommand> for CreateCatalogBrandHandler {
    async fn handle(
        &self,
        request: CreateCatalogBrandCommand,
        cancel: &CancellationToken,
    ) -> Result<CatalogBrandViewModel> {
        let brand = NewCatalogBrand::new(&request.payload.brand)?;
        let brand = self.uow.brands.add(brand, cancel).await?;
        info!(brand_id = %brand.id, brand = %brand.brand, "catalog brand created");
        Ok(brand.into())
    }
}
