//! Core data model definitions shared across the catalog crates.
#![allow(missing_docs)]

pub mod brand;
pub mod dto;
pub mod error;
pub mod ids;
pub mod item;
pub mod paging;
pub mod view;

pub use brand::{CatalogBrand, MAX_BRAND_NAME_LENGTH, NewCatalogBrand};
pub use dto::{CreateCatalogBrandDto, CreateCatalogItemDto, UpdateCatalogItemDto};
pub use error::{ModelError, Result as ModelResult};
pub use ids::{CatalogBrandId, CatalogItemId};
pub use item::{CatalogItem, MAX_ITEM_NAME_LENGTH, NewCatalogItem, PRICE_LIMIT, PRICE_SCALE};
pub use paging::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, PageRequest};
pub use rust_decimal::Decimal;
pub use view::{CatalogBrandViewModel, CatalogItemViewModel};
