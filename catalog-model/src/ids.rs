use serde::{Deserialize, Serialize};

use crate::error::ModelError;

macro_rules! positive_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(try_from = "i64", into = "i64")]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw identifier, rejecting zero and negative values.
            pub fn new(raw: i64) -> Result<Self, ModelError> {
                if raw > 0 {
                    Ok(Self(raw))
                } else {
                    Err(ModelError::InvalidId {
                        kind: $kind,
                        value: raw,
                    })
                }
            }

            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl TryFrom<i64> for $name {
            type Error = ModelError;

            fn try_from(raw: i64) -> Result<Self, Self::Error> {
                Self::new(raw)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

positive_id!(
    /// Store-assigned identifier of a catalog item.
    CatalogItemId,
    "catalog item"
);

positive_id!(
    /// Store-assigned identifier of a catalog brand.
    CatalogBrandId,
    "catalog brand"
);
