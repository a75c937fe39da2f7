pub mod context;
pub mod hilo;
pub mod infrastructure;
pub mod ports;
pub mod postgres;
pub mod retry;

pub use context::DatabaseContext;
pub use hilo::{HiLoAllocator, HiLoSource, InMemorySequence};
pub use postgres::{PostgresDatabase, PostgresOptions};
pub use retry::{RetryPolicy, TransientError};
