pub mod commands;
pub mod handlers;
pub mod queries;
pub mod unit_of_work;

pub use handlers::catalog_dispatcher;
pub use unit_of_work::CatalogUnitOfWork;
