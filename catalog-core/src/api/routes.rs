macro_rules! v1_path {
    ($path:literal) => {
        concat!("/api/v1", $path)
    };
}

/// Versioned route templates for the catalog HTTP surface.
pub mod v1 {
    pub const ROOT: &str = "/api/v1";
    pub const VERSION: &str = "v1";

    pub mod catalog {
        pub const ITEMS: &str = v1_path!("/catalog/items");
        pub const ITEM: &str = v1_path!("/catalog/items/{id}");
        pub const BRANDS: &str = v1_path!("/catalog/brands");
    }
}

pub const HEALTH: &str = "/health";

/// Helpers for filling route templates.
pub mod utils {
    /// Replace a single path parameter (e.g. `"{id}"`) with the provided value.
    pub fn replace_param(
        route: &str,
        param: &str,
        value: impl AsRef<str>,
    ) -> String {
        route.replace(param, value.as_ref())
    }

    /// Append query parameters to the provided route.
    pub fn with_query(route: &str, params: &[(&str, &str)]) -> String {
        if params.is_empty() {
            return route.to_string();
        }

        let mut path = String::with_capacity(route.len() + 1 + params.len() * 8);
        path.push_str(route);
        path.push('?');

        for (i, (key, value)) in params.iter().enumerate() {
            if i > 0 {
                path.push('&');
            }
            path.push_str(key);
            path.push('=');
            path.push_str(value);
        }

        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_route_expands() {
        assert_eq!(v1::catalog::ITEM, "/api/v1/catalog/items/{id}");
        assert_eq!(
            utils::replace_param(v1::catalog::ITEM, "{id}", 7.to_string()),
            "/api/v1/catalog/items/7"
        );
    }

    #[test]
    fn query_is_appended_in_order() {
        assert_eq!(
            utils::with_query(v1::catalog::ITEMS, &[("pageSize", "5"), ("pageIndex", "2")]),
            "/api/v1/catalog/items?pageSize=5&pageIndex=2"
        );
        assert_eq!(utils::with_query(v1::catalog::BRANDS, &[]), v1::catalog::BRANDS);
    }
}
