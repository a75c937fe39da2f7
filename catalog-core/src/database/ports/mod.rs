//! Repository ports for the catalog store.
//!
//! Handlers depend on these traits only; the PostgreSQL and in-memory
//! adapters under `database::infrastructure` implement them.

pub mod catalog_brands;
pub mod catalog_items;
