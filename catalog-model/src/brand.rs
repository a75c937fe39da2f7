use serde::{Deserialize, Serialize};

use crate::{
    error::{ModelError, Result},
    ids::CatalogBrandId,
};

pub const MAX_BRAND_NAME_LENGTH: usize = 100;

/// A named brand referenced by catalog items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogBrand {
    pub id: CatalogBrandId,
    pub brand: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCatalogBrand {
    pub brand: String,
}

impl NewCatalogBrand {
    pub fn new(brand: &str) -> Result<Self> {
        let trimmed = brand.trim();
        if trimmed.is_empty() {
            return Err(ModelError::invalid_field("brand", "must not be empty"));
        }
        if trimmed.chars().count() > MAX_BRAND_NAME_LENGTH {
            return Err(ModelError::invalid_field(
                "brand",
                format!("must be at most {MAX_BRAND_NAME_LENGTH} characters"),
            ));
        }
        Ok(Self {
            brand: trimmed.to_string(),
        })
    }

    pub fn with_id(self, id: CatalogBrandId) -> CatalogBrand {
        CatalogBrand {
            id,
            brand: self.brand,
        }
    }
}
