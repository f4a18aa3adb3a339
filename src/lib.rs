//! Search Gateway Library
//!
//! Query-serving layer that sits between HTTP callers and a full-text index.
//! The binary (`main.rs`) wires these modules together; everything with
//! behaviour worth testing lives here.
//!
//! ## Modules
//! - **`validation`**: Normalizes and escapes raw query text and pagination.
//! - **`geo`**: Classifies the caller's network address into a region, which
//!   decides whether moderation applies.
//! - **`moderation`**: Post-retrieval filtering of hits against an injected blocklist.
//! - **`cache`**: Cache collaborator (Redis or in-process), the cache-aside
//!   wrapper and the background write-back queue.
//! - **`backend`**: Full-text index collaborator; Elasticsearch over HTTP.
//! - **`search`**: Query orchestration, suggestions and the HTTP surface.
//! - **`config`**: Environment-driven process configuration.
//! - **`error`**: Crate-wide error type.

pub mod backend;
pub mod cache;
pub mod config;
pub mod error;
pub mod geo;
pub mod moderation;
pub mod search;
pub mod validation;
