//! HTTP request handlers organized by resource

pub mod brands;
pub mod health;
pub mod items;

pub use brands::{create_brand_handler, list_brands_handler};
pub use health::health_handler;
pub use items::{
    create_item_handler, delete_item_handler, get_item_handler, list_items_handler,
    update_item_handler,
};
