//! Input Validation Module
//!
//! First stage of every search request. Normalizes raw query text and
//! pagination parameters before anything reaches the cache or the index.
//!
//! ## Rules
//! - **Query**: trimmed, rejected when empty, HTML-escaped, then silently
//!   truncated to [`MAX_QUERY_CHARS`] characters.
//! - **Pagination**: never fails. Bad or non-positive values fall back to
//!   page 1 / size [`DEFAULT_PAGE_SIZE`], and size is capped at [`MAX_PAGE_SIZE`].

pub mod input;

pub use input::{
    validate, validate_pagination, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, MAX_QUERY_CHARS,
};
