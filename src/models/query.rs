//! Search query value object
//!
//! A `SearchQuery` is validated before any network call and serialized canonically
//! to derive its cache key.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{Result, SearchError};

// == Query Limits ==
/// Largest page size the backend accepts
pub const MAX_LIMIT: u32 = 100;

/// Default page size
pub const DEFAULT_LIMIT: u32 = 20;

/// Longest accepted free-text query, in characters
pub const MAX_TEXT_LENGTH: usize = 200;

/// Filter names forwarded to the backend as query parameters
pub const KNOWN_FILTERS: [&str; 5] = ["category", "minPrice", "maxPrice", "condition", "sortBy"];

// == Filter Value ==
/// Value of a single search filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Flag(bool),
    Number(f64),
    Text(String),
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::Flag(b) => write!(f, "{b}"),
            FilterValue::Number(n) => write!(f, "{n}"),
            FilterValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        FilterValue::Number(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Flag(value)
    }
}

// == Search Query ==
/// Full-text product search with filters and pagination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub text: String,
    #[serde(default)]
    pub filters: BTreeMap<String, FilterValue>,
    pub page: u32,
    pub limit: u32,
}

impl SearchQuery {
    /// First page of results for `text` with the default page size.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            filters: BTreeMap::new(),
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }

    pub fn with_filter(mut self, name: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.filters.insert(name.into(), value.into());
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    // == Validate ==
    /// Rejects queries the backend would refuse.
    pub fn validate(&self) -> Result<()> {
        if self.page == 0 {
            return Err(invalid("page must be at least 1"));
        }
        if self.limit == 0 || self.limit > MAX_LIMIT {
            return Err(invalid(format!("limit must be between 1 and {MAX_LIMIT}")));
        }
        if self.text.chars().count() > MAX_TEXT_LENGTH {
            return Err(invalid(format!(
                "query text exceeds {MAX_TEXT_LENGTH} characters"
            )));
        }

        for name in self.filters.keys() {
            if !KNOWN_FILTERS.contains(&name.as_str()) {
                return Err(invalid(format!("unknown filter '{name}'")));
            }
        }

        let min_price = self.price_filter("minPrice")?;
        let max_price = self.price_filter("maxPrice")?;
        if let (Some(min), Some(max)) = (min_price, max_price) {
            if min > max {
                return Err(invalid("minPrice must not exceed maxPrice"));
            }
        }

        Ok(())
    }

    fn price_filter(&self, name: &str) -> Result<Option<f64>> {
        match self.filters.get(name) {
            None => Ok(None),
            Some(FilterValue::Number(n)) if n.is_finite() && *n >= 0.0 => Ok(Some(*n)),
            Some(FilterValue::Number(_)) => Err(invalid(format!(
                "{name} must be a non-negative number"
            ))),
            Some(_) => Err(invalid(format!("{name} must be a number"))),
        }
    }

    // == Cache Key ==
    /// Canonical serialization: filter names are sorted and the text is trimmed,
    /// so equivalent queries share a key regardless of construction order.
    pub fn cache_key(&self) -> String {
        json!({
            "q": self.text.trim(),
            "filters": self.filters,
            "page": self.page,
            "limit": self.limit,
        })
        .to_string()
    }

    // == Query Parameters ==
    /// Parameters for the backend search endpoint.
    pub fn to_query_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::with_capacity(self.filters.len() + 3);
        params.push(("q".to_string(), self.text.trim().to_string()));
        for (name, value) in &self.filters {
            params.push((name.clone(), value.to_string()));
        }
        params.push(("page".to_string(), self.page.to_string()));
        params.push(("limit".to_string(), self.limit.to_string()));
        params
    }
}

fn invalid(message: impl Into<String>) -> SearchError {
    SearchError::Validation(message.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_query_defaults() {
        let query = SearchQuery::new("laptop");
        assert_eq!(query.page, 1);
        assert_eq!(query.limit, DEFAULT_LIMIT);
        assert!(query.validate().is_ok());
    }

    #[test]
    fn test_cache_key_ignores_filter_insertion_order() {
        let a = SearchQuery::new("desk")
            .with_filter("maxPrice", 50.0)
            .with_filter("category", "furniture");
        let b = SearchQuery::new("desk")
            .with_filter("category", "furniture")
            .with_filter("maxPrice", 50.0);

        assert_eq!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn test_cache_key_distinguishes_pages_and_text() {
        let base = SearchQuery::new("desk");

        assert_ne!(base.cache_key(), base.clone().with_page(2).cache_key());
        assert_ne!(base.cache_key(), SearchQuery::new("lamp").cache_key());
        assert_eq!(base.cache_key(), SearchQuery::new("  desk ").cache_key());
    }

    #[test]
    fn test_validate_rejects_bad_pagination() {
        assert!(matches!(
            SearchQuery::new("x").with_page(0).validate(),
            Err(SearchError::Validation(_))
        ));
        assert!(SearchQuery::new("x").with_limit(0).validate().is_err());
        assert!(SearchQuery::new("x").with_limit(MAX_LIMIT + 1).validate().is_err());
        assert!(SearchQuery::new("x").with_limit(MAX_LIMIT).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unknown_filter() {
        let query = SearchQuery::new("x").with_filter("color", "red");
        assert_eq!(
            query.validate(),
            Err(SearchError::Validation("unknown filter 'color'".to_string()))
        );
    }

    #[test]
    fn test_validate_price_filters() {
        assert!(SearchQuery::new("x").with_filter("minPrice", -1.0).validate().is_err());
        assert!(SearchQuery::new("x").with_filter("maxPrice", "cheap").validate().is_err());
        assert!(SearchQuery::new("x")
            .with_filter("minPrice", 20.0)
            .with_filter("maxPrice", 10.0)
            .validate()
            .is_err());
        assert!(SearchQuery::new("x")
            .with_filter("minPrice", 10.0)
            .with_filter("maxPrice", 20.0)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_validate_rejects_long_text() {
        let query = SearchQuery::new("a".repeat(MAX_TEXT_LENGTH + 1));
        assert!(query.validate().is_err());
    }

    #[test]
    fn test_query_params() {
        let query = SearchQuery::new(" bike ")
            .with_filter("sortBy", "price_asc")
            .with_filter("category", "sports")
            .with_filter("maxPrice", 150.0)
            .with_page(2)
            .with_limit(10);

        let params = query.to_query_params();
        let expected: Vec<(String, String)> = [
            ("q", "bike"),
            ("category", "sports"),
            ("maxPrice", "150"),
            ("sortBy", "price_asc"),
            ("page", "2"),
            ("limit", "10"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        assert_eq!(params, expected);
    }

    #[test]
    fn test_filter_value_deserialize() {
        let filters: BTreeMap<String, FilterValue> =
            serde_json::from_str(r#"{"a": true, "b": 2.5, "c": "used"}"#).unwrap();

        assert_eq!(filters["a"], FilterValue::Flag(true));
        assert_eq!(filters["b"], FilterValue::Number(2.5));
        assert_eq!(filters["c"], FilterValue::Text("used".to_string()));
    }
}
