use std::collections::HashMap;

use async_trait::async_trait;
use catalog_model::{
    CatalogBrand, CatalogBrandId, CatalogItem, CatalogItemId, CatalogItemViewModel,
    NewCatalogItem,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::application::{
    commands::{CreateCatalogItemCommand, DeleteCatalogItemCommand, UpdateCatalogItemCommand},
    queries::{ReadCatalogItemsQuery, ReadSingleCatalogItemQuery},
    unit_of_work::CatalogUnitOfWork,
};
use crate::database::ports::catalog_brands::CatalogBrandRepository;
use crate::error::{CatalogError, Result};
use crate::mediator::RequestHandler;

/// Project items, resolving every referenced brand in one lookup.
async fn project_items(
    brands: &dyn CatalogBrandRepository,
    items: Vec<CatalogItem>,
    cancel: &CancellationToken,
) -> Result<Vec<CatalogItemViewModel>> {
    let mut ids: Vec<CatalogBrandId> =
        items.iter().filter_map(|item| item.catalog_brand_id).collect();
    ids.sort_unstable();
    ids.dedup();

    let known: HashMap<CatalogBrandId, CatalogBrand> = brands
        .get_many(&ids, cancel)
        .await?
        .into_iter()
        .map(|brand| (brand.id, brand))
        .collect();

    Ok(items
        .into_iter()
        .map(|item| {
            let brand = item.catalog_brand_id.and_then(|id| known.get(&id));
            CatalogItemViewModel::project(item, brand)
        })
        .collect())
}

async fn project_item(
    brands: &dyn CatalogBrandRepository,
    item: CatalogItem,
    cancel: &CancellationToken,
) -> Result<CatalogItemViewModel> {
    let brand = match item.catalog_brand_id {
        Some(id) => brands.get_by_id(id, cancel).await?,
        None => None,
    };
    Ok(CatalogItemViewModel::project(item, brand.as_ref()))
}

/// Fail when `id` names a brand that does not exist.
async fn require_brand(
    brands: &dyn CatalogBrandRepository,
    id: Option<CatalogBrandId>,
    cancel: &CancellationToken,
) -> Result<Option<CatalogBrand>> {
    let Some(id) = id else {
        return Ok(None);
    };
    match brands.get_by_id(id, cancel).await? {
        Some(brand) => Ok(Some(brand)),
        None => Err(CatalogError::Validation(format!(
            "catalogBrandId: brand {id} does not exist"
        ))),
    }
}

#[derive(Debug, Clone)]
pub struct ReadCatalogItemsHandler {
    uow: CatalogUnitOfWork,
}

impl ReadCatalogItemsHandler {
    pub fn new(uow: CatalogUnitOfWork) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl RequestHandler<ReadCatalogItemsQuery> for ReadCatalogItemsHandler {
    async fn handle(
        &self,
        request: ReadCatalogItemsQuery,
        cancel: &CancellationToken,
    ) -> Result<Vec<CatalogItemViewModel>> {
        let items = self.uow.items.get_all(request.page, cancel).await?;
        debug!(
            page_size = request.page.page_size(),
            page_index = request.page.page_index(),
            returned = items.len(),
            "read catalog items page"
        );
        project_items(self.uow.brands.as_ref(), items, cancel).await
    }
}

#[derive(Debug, Clone)]
pub struct ReadSingleCatalogItemHandler {
    uow: CatalogUnitOfWork,
}

impl ReadSingleCatalogItemHandler {
    pub fn new(uow: CatalogUnitOfWork) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl RequestHandler<ReadSingleCatalogItemQuery> for ReadSingleCatalogItemHandler {
    async fn handle(
        &self,
        request: ReadSingleCatalogItemQuery,
        cancel: &CancellationToken,
    ) -> Result<Option<CatalogItemViewModel>> {
        match self.uow.items.get_by_id(request.id, cancel).await? {
            Some(item) => Ok(Some(
                project_item(self.uow.brands.as_ref(), item, cancel).await?,
            )),
            None => Ok(None),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateCatalogItemHandler {
    uow: CatalogUnitOfWork,
}

impl CreateCatalogItemHandler {
    pub fn new(uow: CatalogUnitOfWork) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl RequestHandler<CreateCatalogItemCommand> for CreateCatalogItemHandler {
    async fn handle(
        &self,
        request: CreateCatalogItemCommand,
        cancel: &CancellationToken,
    ) -> Result<CatalogItemViewModel> {
        let new_item = NewCatalogItem::from_dto(request.payload)?;
        let brand =
            require_brand(self.uow.brands.as_ref(), new_item.catalog_brand_id, cancel).await?;

        let item = self.uow.items.add(new_item, cancel).await?;
        info!(item_id = %item.id, name = %item.name, "catalog item created");

        Ok(CatalogItemViewModel::project(item, brand.as_ref()))
    }
}

#[derive(Debug, Clone)]
pub struct UpdateCatalogItemHandler {
    uow: CatalogUnitOfWork,
}

impl UpdateCatalogItemHandler {
    pub fn new(uow: CatalogUnitOfWork) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl RequestHandler<UpdateCatalogItemCommand> for UpdateCatalogItemHandler {
    async fn handle(
        &self,
        request: UpdateCatalogItemCommand,
        cancel: &CancellationToken,
    ) -> Result<Option<CatalogItemViewModel>> {
        let Ok(id) = CatalogItemId::new(request.id) else {
            return Ok(None);
        };
        let Some(mut item) = self.uow.items.get_by_id(id, cancel).await? else {
            return Ok(None);
        };

        let brand_changed = request.payload.catalog_brand_id.is_some();
        item.apply_update(request.payload)?;
        if brand_changed {
            require_brand(self.uow.brands.as_ref(), item.catalog_brand_id, cancel).await?;
        }

        let Some(updated) = self.uow.items.update(item, cancel).await? else {
            // Removed concurrently between the read and the write.
            return Ok(None);
        };
        info!(item_id = %updated.id, "catalog item updated");

        Ok(Some(
            project_item(self.uow.brands.as_ref(), updated, cancel).await?,
        ))
    }
}

#[derive(Debug, Clone)]
pub struct DeleteCatalogItemHandler {
    uow: CatalogUnitOfWork,
}

impl DeleteCatalogItemHandler {
    pub fn new(uow: CatalogUnitOfWork) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl RequestHandler<DeleteCatalogItemCommand> for DeleteCatalogItemHandler {
    async fn handle(
        &self,
        request: DeleteCatalogItemCommand,
        cancel: &CancellationToken,
    ) -> Result<bool> {
        let Ok(id) = CatalogItemId::new(request.id) else {
            return Ok(false);
        };
        if self.uow.items.get_by_id(id, cancel).await?.is_none() {
            return Ok(false);
        }

        let removed = self.uow.items.remove(id, cancel).await?.is_some();
        if removed {
            info!(item_id = %id, "catalog item deleted");
        }
        Ok(removed)
    }
}
