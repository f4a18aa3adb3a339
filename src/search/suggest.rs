//! Query suggestions.
//!
//! Stand-in for a real completion index: a fixed set of suffixes appended to
//! the query. Pure and deterministic.

const SUGGESTION_SUFFIXES: [&str; 3] = ["tutorial", "example", "docs"];

pub const SUGGESTION_COUNT: usize = SUGGESTION_SUFFIXES.len();

pub fn suggest(query: &str) -> Vec<String> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }

    SUGGESTION_SUFFIXES
        .iter()
        .map(|suffix| format!("{} {}", query, suffix))
        .collect()
}
