//! Search Service Module
//!
//! The request pipeline between HTTP callers and the full-text index.
//!
//! ## Pipeline
//! 1. **Validate**: raw query and pagination become an immutable `Query`.
//! 2. **Cache lookup**: keyed by a fingerprint of (normalized query, page, size).
//! 3. **Backend query** on a miss: whitespace tokens, `title^3`/`content`
//!    fields, paging window, highlight fragments.
//! 4. **Suggestions** are attached and the result is queued for write-back.
//! 5. **Moderation** runs on the way out when the caller is in a restricted region.
//!
//! ## Submodules
//! - **`engine`**: `SearchService`, the query orchestrator.
//! - **`handlers`**: Axum handlers and the router.
//! - **`response`**: moderation and final response assembly.
//! - **`suggest`**: deterministic query suggestions.
//! - **`tokenizer`**: whitespace tokenization.
//! - **`types`**: request, document and response types.

pub mod engine;
pub mod handlers;
pub mod response;
pub mod suggest;
pub mod tokenizer;
pub mod types;

pub use engine::SearchService;
