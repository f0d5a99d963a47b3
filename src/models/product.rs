//! Search result schema
//!
//! Typed bodies returned by the backend search API. Bodies that fail to decode
//! are treated as transport failures.

use serde::{Deserialize, Serialize};

/// A marketplace listing as returned by search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub title: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller_name: Option<String>,
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub items: Vec<Product>,
    pub total_count: u32,
    pub page: u32,
    pub has_more: bool,
}

impl SearchResult {
    pub fn empty(page: u32) -> Self {
        Self {
            items: Vec::new(),
            total_count: 0,
            page,
            has_more: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_result_deserialize() {
        let json = r#"{
            "items": [
                {"id": "p1", "title": "Calculus textbook", "price": 25.0, "condition": "used"},
                {"id": "p2", "title": "Desk lamp", "price": 12.5, "imageUrl": "https://cdn/lamp.jpg"}
            ],
            "totalCount": 42,
            "page": 1,
            "hasMore": true
        }"#;

        let result: SearchResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.items.len(), 2);
        assert_eq!(result.total_count, 42);
        assert!(result.has_more);
        assert_eq!(result.items[0].condition.as_deref(), Some("used"));
        assert_eq!(result.items[1].image_url.as_deref(), Some("https://cdn/lamp.jpg"));
    }

    #[test]
    fn test_missing_required_field_is_rejected() {
        let json = r#"{"items": [], "page": 1, "hasMore": false}"#;
        assert!(serde_json::from_str::<SearchResult>(json).is_err());
    }

    #[test]
    fn test_serialize_uses_camel_case() {
        let json = serde_json::to_string(&SearchResult::empty(3)).unwrap();
        assert!(json.contains("\"totalCount\":0"));
        assert!(json.contains("\"hasMore\":false"));
    }
}
