//! Pagination and search query parameters.

use serde::Deserialize;
use serde_json::json;
use serde_with::{DisplayFromStr, serde_as};

use crate::domain::entities::BookFilter;
use crate::error::AppError;

/// Default page size for `GET /books`.
pub const DEFAULT_LIST_LIMIT: i64 = 20;
/// Default page size for `GET /books/search`.
pub const DEFAULT_SEARCH_LIMIT: i64 = 10;
/// Upper bound accepted for `limit`.
pub const MAX_LIMIT: i64 = 1000;

/// Offset pagination query parameters.
///
/// Uses `serde_with` to parse numbers from query strings, which also works
/// when the struct is flattened into another parameter set.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub skip: Option<i64>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub limit: Option<i64>,
}

impl PageParams {
    /// Validates the parameters and returns `(skip, limit)`.
    ///
    /// # Defaults
    ///
    /// - `skip`: 0
    /// - `limit`: `default_limit`
    ///
    /// # Validation
    ///
    /// - `skip` must not be negative
    /// - `limit` must be between 0 and [`MAX_LIMIT`]; `0` yields an empty page
    pub fn resolve(&self, default_limit: i64) -> Result<(i64, i64), AppError> {
        let skip = self.skip.unwrap_or(0);
        let limit = self.limit.unwrap_or(default_limit);

        if skip < 0 {
            return Err(AppError::bad_request(
                "skip must not be negative",
                json!({ "skip": skip }),
            ));
        }

        if !(0..=MAX_LIMIT).contains(&limit) {
            return Err(AppError::bad_request(
                format!("limit must be between 0 and {}", MAX_LIMIT),
                json!({ "limit": limit }),
            ));
        }

        Ok((skip, limit))
    }
}

/// Query parameters for `GET /books/search`.
///
/// An empty text predicate (`?title=`) counts as absent; any other value,
/// whitespace included, is matched as given.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub title: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub min_pages: Option<i32>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub max_pages: Option<i32>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub available: Option<bool>,

    #[serde(flatten)]
    pub page: PageParams,
}

impl SearchParams {
    /// Builds the domain filter.
    ///
    /// Bounds are passed through unchecked: `min_pages > max_pages` simply
    /// matches nothing.
    pub fn to_filter(&self) -> BookFilter {
        fn non_empty(value: &Option<String>) -> Option<String> {
            value.clone().filter(|v| !v.is_empty())
        }

        BookFilter {
            title: non_empty(&self.title),
            author: non_empty(&self.author),
            category: non_empty(&self.category),
            min_pages: self.min_pages,
            max_pages: self.max_pages,
            available: self.available,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(skip: Option<i64>, limit: Option<i64>) -> PageParams {
        PageParams { skip, limit }
    }

    #[test]
    fn test_defaults() {
        assert_eq!(
            params(None, None).resolve(DEFAULT_LIST_LIMIT).unwrap(),
            (0, 20)
        );
        assert_eq!(
            params(None, None).resolve(DEFAULT_SEARCH_LIMIT).unwrap(),
            (0, 10)
        );
    }

    #[test]
    fn test_custom_values() {
        assert_eq!(params(Some(3), Some(5)).resolve(20).unwrap(), (3, 5));
    }

    #[test]
    fn test_negative_skip_is_error() {
        assert!(params(Some(-1), None).resolve(20).is_err());
    }

    #[test]
    fn test_limit_bounds() {
        assert!(params(None, Some(-1)).resolve(20).is_err());
        assert_eq!(params(None, Some(0)).resolve(20).unwrap(), (0, 0));
        assert!(params(None, Some(MAX_LIMIT)).resolve(20).is_ok());
        assert!(params(None, Some(MAX_LIMIT + 1)).resolve(20).is_err());
    }

    #[test]
    fn test_search_params_from_strings() {
        let json = r#"{"category": "Fiction", "min_pages": "100", "max_pages": "200", "available": "true", "skip": "2"}"#;
        let p: SearchParams = serde_json::from_str(json).unwrap();
        let filter = p.to_filter();

        assert_eq!(filter.category.as_deref(), Some("Fiction"));
        assert_eq!(filter.min_pages, Some(100));
        assert_eq!(filter.max_pages, Some(200));
        assert_eq!(filter.available, Some(true));
        assert!(filter.title.is_none());
        assert_eq!(p.page.resolve(DEFAULT_SEARCH_LIMIT).unwrap(), (2, 10));
    }

    #[test]
    fn test_empty_text_is_absent() {
        let p = SearchParams {
            title: Some(String::new()),
            ..Default::default()
        };
        assert!(p.to_filter().is_empty());
    }

    #[test]
    fn test_text_kept_verbatim() {
        let p = SearchParams {
            title: Some(" of ".to_string()),
            author: Some("   ".to_string()),
            ..Default::default()
        };
        let filter = p.to_filter();

        assert_eq!(filter.title.as_deref(), Some(" of "));
        assert_eq!(filter.author.as_deref(), Some("   "));
    }

    #[test]
    fn test_inverted_page_bounds_pass_through() {
        let p = SearchParams {
            min_pages: Some(300),
            max_pages: Some(100),
            ..Default::default()
        };
        let filter = p.to_filter();

        assert_eq!((filter.min_pages, filter.max_pages), (Some(300), Some(100)));
    }
}
