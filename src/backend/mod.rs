//! Full-Text Backend Module
//!
//! The index engine is an external collaborator. This module defines the
//! capability the gateway needs from it ([`SearchBackend`]) and one
//! implementation speaking the Elasticsearch REST API.
//!
//! ## Submodules
//! - **`client`**: the `SearchBackend` trait.
//! - **`elastic`**: HTTP implementation built on `reqwest`.
//! - **`types`**: backend query/page values and the Elasticsearch wire DTOs.

pub mod client;
pub mod elastic;
pub mod types;

pub use client::SearchBackend;
pub use elastic::ElasticsearchBackend;
pub use types::{BackendPage, BackendQuery, FieldBoost};
