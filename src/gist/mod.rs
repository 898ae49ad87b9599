// src/gist/mod.rs
// =============================================================================
// This module is the whole Gist API binding.
//
// Submodules:
// - fetch: GistClient, endpoint URLs, HTTP GET + JSON decoding
// - metadata: serde types for the API's JSON
// - entity: Gist, one gist with lazily loaded metadata
// - listing: Gists / fetch_by_user, all gists of a user in one request
// =============================================================================

mod entity;
mod fetch;
mod listing;
mod metadata;

pub use entity::Gist;
pub use fetch::{ClientBuilder, ClientConfig, GistClient, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use listing::{fetch_by_user, Gists};
pub use metadata::{GistFiles, GistMetadata};
