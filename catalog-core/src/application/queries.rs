//! Read-side requests.

use catalog_model::{CatalogBrandViewModel, CatalogItemId, CatalogItemViewModel, PageRequest};

use crate::mediator::Request;

#[derive(Debug, Clone, Copy, Default)]
pub struct ReadCatalogItemsQuery {
    pub page: PageRequest,
}

impl Request for ReadCatalogItemsQuery {
    type Response = Vec<CatalogItemViewModel>;
}

/// The id is already known to be positive; the HTTP layer rejects anything
/// else before dispatch.
#[derive(Debug, Clone, Copy)]
pub struct ReadSingleCatalogItemQuery {
    pub id: CatalogItemId,
}

impl Request for ReadSingleCatalogItemQuery {
    type Response = Option<CatalogItemViewModel>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReadCatalogBrandsQuery;

impl Request for ReadCatalogBrandsQuery {
    type Response = Vec<CatalogBrandViewModel>;
}
