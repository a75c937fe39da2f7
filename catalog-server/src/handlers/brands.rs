use axum::{
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use catalog_core::application::{
    commands::CreateCatalogBrandCommand, queries::ReadCatalogBrandsQuery,
};
use catalog_model::{CatalogBrandViewModel, CreateCatalogBrandDto};

use crate::infra::{app_state::AppState, errors::AppResult};

pub async fn list_brands_handler(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<CatalogBrandViewModel>>> {
    let brands = state.send(ReadCatalogBrandsQuery).await?;
    Ok(Json(brands))
}

pub async fn create_brand_handler(
    State(state): State<AppState>,
    payload: Result<Json<CreateCatalogBrandDto>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(payload) = payload?;
    let brand = state.send(CreateCatalogBrandCommand { payload }).await?;
    Ok((StatusCode::CREATED, Json(brand)))
}
