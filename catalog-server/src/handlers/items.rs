use axum::{
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Json},
};
use catalog_core::{
    api::routes::{utils::replace_param, v1},
    application::{
        commands::{CreateCatalogItemCommand, DeleteCatalogItemCommand, UpdateCatalogItemCommand},
        queries::{ReadCatalogItemsQuery, ReadSingleCatalogItemQuery},
    },
};
use catalog_model::{
    CatalogItemId, CatalogItemViewModel, CreateCatalogItemDto, DEFAULT_PAGE_SIZE, PageRequest,
    UpdateCatalogItemDto,
};
use serde::Deserialize;
use tracing::debug;

use crate::infra::{
    app_state::AppState,
    errors::{AppError, AppResult},
};

/// `?pageSize=&pageIndex=`; absent values fall back to 10 and 0.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagingParams {
    pub page_size: Option<i64>,
    pub page_index: Option<i64>,
}

impl PagingParams {
    pub fn to_page(&self) -> AppResult<PageRequest> {
        let page = PageRequest::new(
            self.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            self.page_index.unwrap_or(0),
        )?;
        Ok(page)
    }
}

fn item_not_found(id: i64) -> AppError {
    AppError::not_found(format!("Catalog item {id} not found"))
}

pub async fn list_items_handler(
    State(state): State<AppState>,
    params: Result<Query<PagingParams>, QueryRejection>,
) -> AppResult<Json<Vec<CatalogItemViewModel>>> {
    let Query(params) = params?;
    let page = params.to_page()?;
    let items = state.send(ReadCatalogItemsQuery { page }).await?;
    Ok(Json(items))
}

pub async fn get_item_handler(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<CatalogItemViewModel>> {
    let Path(raw_id) = id?;
    // Rejected here so the dispatcher never sees a non-positive id.
    let id = CatalogItemId::new(raw_id)?;

    state
        .send(ReadSingleCatalogItemQuery { id })
        .await?
        .map(Json)
        .ok_or_else(|| item_not_found(raw_id))
}

pub async fn create_item_handler(
    State(state): State<AppState>,
    payload: Result<Json<CreateCatalogItemDto>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(payload) = payload?;
    let item = state.send(CreateCatalogItemCommand { payload }).await?;
    let location = replace_param(v1::catalog::ITEM, "{id}", item.id.to_string());
    debug!(item_id = %item.id, location = %location, "catalog item created");
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(item)))
}

pub async fn update_item_handler(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateCatalogItemDto>, JsonRejection>,
) -> AppResult<Json<CatalogItemViewModel>> {
    let Path(id) = id?;
    let Json(payload) = payload?;

    state
        .send(UpdateCatalogItemCommand { id, payload })
        .await?
        .map(Json)
        .ok_or_else(|| item_not_found(id))
}

pub async fn delete_item_handler(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<StatusCode> {
    let Path(id) = id?;

    if state.send(DeleteCatalogItemCommand { id }).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(item_not_found(id))
    }
}
