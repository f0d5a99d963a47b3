//! API Module
//!
//! HTTP handlers and routing exposing the search gateway.
//!
//! # Endpoints
//! - `GET /search` - One page of search results
//! - `GET /search/autocomplete` - Query suggestions
//! - `DELETE /search/cache` - Drop all cached results
//! - `GET /stats` - Cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
