//! Data model for the search gateway
//!
//! Query and result schemas exchanged with the backend, plus the DTOs used for
//! serializing/deserializing the service's HTTP request and response bodies.

pub mod product;
pub mod query;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use product::{Product, SearchResult};
pub use query::{FilterValue, SearchQuery, DEFAULT_LIMIT, KNOWN_FILTERS, MAX_LIMIT};
pub use requests::{AutocompleteParams, SearchParams};
pub use responses::{
    CacheReport, HealthResponse, MessageResponse, StatsResponse, SuggestionsResponse,
};
