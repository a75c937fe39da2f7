use catalog_model::ModelError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    /// Caller supplied input that cannot be processed.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The store stayed unreachable after the retry policy gave up.
    #[error("Catalog store unavailable after {attempts} attempt(s): {message}")]
    Connectivity { attempts: u32, message: String },

    /// Handler registry is inconsistent; raised while building the dispatcher.
    #[error("Dispatcher configuration error: {0}")]
    Configuration(String),

    #[error("Operation cancelled: {0}")]
    Cancelled(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CatalogError {
    pub fn cancelled(operation: &str) -> Self {
        CatalogError::Cancelled(operation.to_string())
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, CatalogError::Cancelled(_))
    }
}

impl From<ModelError> for CatalogError {
    fn from(err: ModelError) -> Self {
        CatalogError::Validation(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
