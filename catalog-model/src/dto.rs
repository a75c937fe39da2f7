//! Request payloads accepted by the HTTP surface.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ids::CatalogBrandId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCatalogItemDto {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub picture_file_name: Option<String>,
    #[serde(default)]
    pub catalog_brand_id: Option<CatalogBrandId>,
    #[serde(default)]
    pub available_stock: i32,
    #[serde(default)]
    pub restock_threshold: i32,
    #[serde(default)]
    pub max_stock_threshold: i32,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCatalogItemDto {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub picture_file_name: Option<String>,
    #[serde(default)]
    pub catalog_brand_id: Option<CatalogBrandId>,
    #[serde(default)]
    pub available_stock: Option<i32>,
    #[serde(default)]
    pub restock_threshold: Option<i32>,
    #[serde(default)]
    pub max_stock_threshold: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCatalogBrandDto {
    pub brand: String,
}
