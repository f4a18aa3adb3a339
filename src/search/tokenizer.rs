/// Splits a query into whitespace-separated terms.
///
/// No linguistic analysis happens here; stemming, stop words and CJK
/// segmentation are left to the index's own analyzer.
pub fn tokenize_query(query: &str) -> Vec<String> {
    query.split_whitespace().map(str::to_string).collect()
}

/// Re-joins terms into the single query string sent to the index.
pub fn join_terms(terms: &[String]) -> String {
    terms.join(" ")
}
