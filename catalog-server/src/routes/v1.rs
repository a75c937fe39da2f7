use axum::{
    Router,
    routing::get,
};
use catalog_core::api::routes::v1;

use crate::{
    AppState,
    handlers::{
        create_brand_handler, create_item_handler, delete_item_handler, get_item_handler,
        list_brands_handler, list_items_handler, update_item_handler,
    },
};

/// Create all v1 API routes
pub fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route(
            v1::catalog::ITEMS,
            get(list_items_handler).post(create_item_handler),
        )
        .route(
            v1::catalog::ITEM,
            get(get_item_handler)
                .put(update_item_handler)
                .delete(delete_item_handler),
        )
        .route(
            v1::catalog::BRANDS,
            get(list_brands_handler).post(create_brand_handler),
        )
}
