//! PostgreSQL adapters implementing the catalog ports.

pub mod catalog_brands;
pub mod catalog_items;
pub mod sequence;

pub use catalog_brands::PostgresCatalogBrandRepository;
pub use catalog_items::PostgresCatalogItemRepository;
pub use sequence::PostgresSequence;
