//! Read-optimised projections returned to callers.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    brand::CatalogBrand,
    ids::{CatalogBrandId, CatalogItemId},
    item::CatalogItem,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItemViewModel {
    pub id: CatalogItemId,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub picture_file_name: Option<String>,
    pub catalog_brand_id: Option<CatalogBrandId>,
    pub catalog_brand: Option<String>,
    pub available_stock: i32,
    pub restock_threshold: i32,
    pub max_stock_threshold: i32,
}

impl CatalogItemViewModel {
    /// Project an item, resolving the brand name when the brand is known.
    pub fn project(item: CatalogItem, brand: Option<&CatalogBrand>) -> Self {
        let catalog_brand = brand
            .filter(|brand| Some(brand.id) == item.catalog_brand_id)
            .map(|brand| brand.brand.clone());

        Self {
            id: item.id,
            name: item.name,
            description: item.description,
            price: item.price,
            picture_file_name: item.picture_file_name,
            catalog_brand_id: item.catalog_brand_id,
            catalog_brand,
            available_stock: item.available_stock,
            restock_threshold: item.restock_threshold,
            max_stock_threshold: item.max_stock_threshold,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogBrandViewModel {
    pub id: CatalogBrandId,
    pub brand: String,
}

impl From<CatalogBrand> for CatalogBrandViewModel {
    fn from(brand: CatalogBrand) -> Self {
        Self {
            id: brand.id,
            brand: brand.brand,
        }
    }
}
