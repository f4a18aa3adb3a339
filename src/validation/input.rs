pub const MAX_QUERY_CHARS: usize = 100;
pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 50;

/// Normalizes raw query text.
///
/// Returns `None` when nothing is left after trimming. The text is escaped so
/// the result is safe to hand to the index and to echo into HTML, and the
/// escaped form is then cut to [`MAX_QUERY_CHARS`] characters (not bytes, so
/// multi-byte text is never split mid-character). A cut may leave a partial
/// entity such as `&l`, which still carries no raw markup.
pub fn validate(raw_query: &str) -> Option<String> {
    let trimmed = raw_query.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut escaped = html_escape::encode_quoted_attribute(trimmed).into_owned();
    if let Some((byte_idx, _)) = escaped.char_indices().nth(MAX_QUERY_CHARS) {
        escaped.truncate(byte_idx);
    }

    Some(escaped)
}

/// Resolves pagination parameters to usable values. Cannot fail.
pub fn validate_pagination(page_raw: Option<&str>, size_raw: Option<&str>) -> (u32, u32) {
    let page = parse_positive(page_raw).unwrap_or(DEFAULT_PAGE);
    let size = parse_positive(size_raw)
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .min(MAX_PAGE_SIZE);

    (page, size)
}

fn parse_positive(raw: Option<&str>) -> Option<u32> {
    // Parse as i64 first so "-5" is recognized as non-positive rather than
    // a parse failure; both end up at the default anyway.
    let value: i64 = raw?.trim().parse().ok()?;
    if value < 1 {
        return None;
    }
    Some(u32::try_from(value).unwrap_or(u32::MAX))
}
