pub mod v1;

use axum::{
    Router,
    http::HeaderValue,
    routing::get,
};
use catalog_core::api::routes::HEALTH;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::{AppState, handlers::health_handler, infra::config::CorsConfig};

/// Create the main API router with all versions
pub fn create_api_router() -> Router<AppState> {
    Router::new().merge(v1::create_v1_router())
}

/// Full application: health probe, versioned API, CORS (when configured)
/// and request tracing.
pub fn create_app(state: AppState) -> Router {
    let mut app = Router::new()
        .route(HEALTH, get(health_handler))
        .merge(create_api_router());

    if let Some(cors) = cors_layer(&state.config().cors) {
        app = app.layer(cors);
    }

    app.layer(TraceLayer::new_for_http()).with_state(state)
}

fn cors_layer(config: &CorsConfig) -> Option<CorsLayer> {
    if !config.is_enabled() {
        return None;
    }

    let allow_origin = if config.is_wildcard_included() {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(origin = %origin, "ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    Some(
        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods(AllowMethods::any())
            .allow_headers(AllowHeaders::any()),
    )
}
