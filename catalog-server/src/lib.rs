//! HTTP surface of the catalog service.
//!
//! [`routes::create_app`] builds the axum router over an [`AppState`], whose
//! dispatcher forwards each request to the catalog handlers in `catalog-core`.

pub mod handlers;
pub mod infra;
pub mod routes;

pub use infra::app_state::AppState;
