//! Write-side requests.

use catalog_model::{
    CatalogBrandViewModel, CatalogItemViewModel, CreateCatalogBrandDto, CreateCatalogItemDto,
    UpdateCatalogItemDto,
};

use crate::mediator::Request;

#[derive(Debug, Clone)]
pub struct CreateCatalogItemCommand {
    pub payload: CreateCatalogItemDto,
}

impl Request for CreateCatalogItemCommand {
    type Response = CatalogItemViewModel;
}

/// `id` is the raw path value; a non-positive id is answered with `None`.
#[derive(Debug, Clone)]
pub struct UpdateCatalogItemCommand {
    pub id: i64,
    pub payload: UpdateCatalogItemDto,
}

impl Request for UpdateCatalogItemCommand {
    type Response = Option<CatalogItemViewModel>;
}

/// Responds with whether an item was removed.
#[derive(Debug, Clone, Copy)]
pub struct DeleteCatalogItemCommand {
    pub id: i64,
}

impl Request for DeleteCatalogItemCommand {
    type Response = bool;
}

#[derive(Debug, Clone)]
pub struct CreateCatalogBrandCommand {
    pub payload: CreateCatalogBrandDto,
}

impl Request for CreateCatalogBrandCommand {
    type Response = CatalogBrandViewModel;
}
