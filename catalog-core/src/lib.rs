//! Core of the catalog service.
//!
//! Requests enter through the [`mediator::Dispatcher`], which hands each typed
//! command or query to exactly one handler in [`application::handlers`].
//! Handlers work against the repository ports in [`database::ports`]; the
//! PostgreSQL adapter runs every statement under a [`database::RetryPolicy`]
//! and assigns ids through high-low allocation.

pub mod api;
pub mod application;
pub mod cancellation;
pub mod database;
pub mod error;
pub mod mediator;

pub use error::{CatalogError, Result};
