//! Request DTOs for the search service API
//!
//! Defines the query strings accepted by the HTTP endpoints.

use serde::Deserialize;

use crate::error::{Result, SearchError};
use crate::models::{SearchQuery, DEFAULT_LIMIT};

/// Query string for `GET /search`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub condition: Option<String>,
    pub sort_by: Option<String>,
    /// Signed so that negative pages reach validation instead of failing extraction
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl SearchParams {
    /// Converts the query string into a validated `SearchQuery`.
    pub fn into_query(self) -> Result<SearchQuery> {
        let page = to_u32("page", self.page.unwrap_or(1))?;
        let limit = to_u32("limit", self.limit.unwrap_or(DEFAULT_LIMIT as i64))?;

        let mut query = SearchQuery::new(self.q).with_page(page).with_limit(limit);
        if let Some(category) = self.category {
            query = query.with_filter("category", category);
        }
        if let Some(min_price) = self.min_price {
            query = query.with_filter("minPrice", min_price);
        }
        if let Some(max_price) = self.max_price {
            query = query.with_filter("maxPrice", max_price);
        }
        if let Some(condition) = self.condition {
            query = query.with_filter("condition", condition);
        }
        if let Some(sort_by) = self.sort_by {
            query = query.with_filter("sortBy", sort_by);
        }

        query.validate()?;
        Ok(query)
    }
}

fn to_u32(name: &str, value: i64) -> Result<u32> {
    if value < 1 {
        return Err(SearchError::Validation(format!("{name} must be at least 1")));
    }
    u32::try_from(value)
        .map_err(|_| SearchError::Validation(format!("{name} is out of range")))
}

/// Query string for `GET /search/autocomplete`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AutocompleteParams {
    #[serde(default)]
    pub q: String,
    pub limit: Option<u32>,
}
