use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Offset/limit window over the item collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    page_size: i64,
    page_index: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            page_index: 0,
        }
    }
}

impl PageRequest {
    pub fn new(page_size: i64, page_index: i64) -> Result<Self> {
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(ModelError::invalid_field(
                "pageSize",
                format!("must be between 1 and {MAX_PAGE_SIZE}"),
            ));
        }
        if page_index < 0 {
            return Err(ModelError::invalid_field("pageIndex", "must not be negative"));
        }
        Ok(Self {
            page_size,
            page_index,
        })
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    pub fn page_index(&self) -> i64 {
        self.page_index
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        self.page_size.saturating_mul(self.page_index)
    }
}
