use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    dto::{CreateCatalogItemDto, UpdateCatalogItemDto},
    error::{ModelError, Result},
    ids::{CatalogBrandId, CatalogItemId},
};

pub const MAX_ITEM_NAME_LENGTH: usize = 50;

/// Prices are stored as `NUMERIC(18, 2)`.
pub const PRICE_SCALE: u32 = 2;
/// Exclusive upper bound implied by sixteen integer digits.
pub const PRICE_LIMIT: Decimal = Decimal::from_parts(1_874_919_424, 2_328_306, 0, false, 0);

/// A sellable product record as persisted by the catalog store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: CatalogItemId,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub picture_file_name: Option<String>,
    pub catalog_brand_id: Option<CatalogBrandId>,
    pub available_stock: i32,
    pub restock_threshold: i32,
    pub max_stock_threshold: i32,
}

/// A validated catalog item that has not been assigned an identifier yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCatalogItem {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub picture_file_name: Option<String>,
    pub catalog_brand_id: Option<CatalogBrandId>,
    pub available_stock: i32,
    pub restock_threshold: i32,
    pub max_stock_threshold: i32,
}

impl NewCatalogItem {
    pub fn from_dto(dto: CreateCatalogItemDto) -> Result<Self> {
        let item = Self {
            name: validate_name(&dto.name)?,
            description: dto.description,
            price: validate_price(dto.price)?,
            picture_file_name: dto.picture_file_name,
            catalog_brand_id: dto.catalog_brand_id,
            available_stock: validate_stock("availableStock", dto.available_stock)?,
            restock_threshold: validate_stock("restockThreshold", dto.restock_threshold)?,
            max_stock_threshold: validate_stock(
                "maxStockThreshold",
                dto.max_stock_threshold,
            )?,
        };
        Ok(item)
    }

    pub fn with_id(self, id: CatalogItemId) -> CatalogItem {
        CatalogItem {
            id,
            name: self.name,
            description: self.description,
            price: self.price,
            picture_file_name: self.picture_file_name,
            catalog_brand_id: self.catalog_brand_id,
            available_stock: self.available_stock,
            restock_threshold: self.restock_threshold,
            max_stock_threshold: self.max_stock_threshold,
        }
    }
}

impl CatalogItem {
    /// Apply the fields present in `dto`, leaving the others untouched.
    ///
    /// Validation happens before any field is written, so a rejected update
    /// leaves the item as it was.
    pub fn apply_update(&mut self, dto: UpdateCatalogItemDto) -> Result<()> {
        let name = dto.name.as_deref().map(validate_name).transpose()?;
        let price = dto.price.map(validate_price).transpose()?;
        let available_stock = dto
            .available_stock
            .map(|v| validate_stock("availableStock", v))
            .transpose()?;
        let restock_threshold = dto
            .restock_threshold
            .map(|v| validate_stock("restockThreshold", v))
            .transpose()?;
        let max_stock_threshold = dto
            .max_stock_threshold
            .map(|v| validate_stock("maxStockThreshold", v))
            .transpose()?;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(price) = price {
            self.price = price;
        }
        if let Some(description) = dto.description {
            self.description = Some(description);
        }
        if let Some(picture) = dto.picture_file_name {
            self.picture_file_name = Some(picture);
        }
        if let Some(brand) = dto.catalog_brand_id {
            self.catalog_brand_id = Some(brand);
        }
        if let Some(value) = available_stock {
            self.available_stock = value;
        }
        if let Some(value) = restock_threshold {
            self.restock_threshold = value;
        }
        if let Some(value) = max_stock_threshold {
            self.max_stock_threshold = value;
        }
        Ok(())
    }
}

fn validate_name(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ModelError::invalid_field("name", "must not be empty"));
    }
    if trimmed.chars().count() > MAX_ITEM_NAME_LENGTH {
        return Err(ModelError::invalid_field(
            "name",
            format!("must be at most {MAX_ITEM_NAME_LENGTH} characters"),
        ));
    }
    Ok(trimmed.to_string())
}

fn validate_price(price: Decimal) -> Result<Decimal> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(ModelError::invalid_field("price", "must not be negative"));
    }
    if price.normalize().scale() > PRICE_SCALE {
        return Err(ModelError::invalid_field(
            "price",
            format!("must have at most {PRICE_SCALE} decimal places"),
        ));
    }
    if price >= PRICE_LIMIT {
        return Err(ModelError::invalid_field(
            "price",
            format!("must be less than {PRICE_LIMIT}"),
        ));
    }
    Ok(price)
}

fn validate_stock(field: &'static str, value: i32) -> Result<i32> {
    if value < 0 {
        return Err(ModelError::invalid_field(field, "must not be negative"));
    }
    Ok(value)
}
