//! Gateway Module
//!
//! Search and autocomplete for UI callers, backed by the result caches, the
//! request coalescer and the external search API.

mod backend;
pub mod global;
mod service;

pub use backend::{HttpSearchBackend, SearchBackend};
pub use service::{SearchGateway, MIN_AUTOCOMPLETE_CHARS};
