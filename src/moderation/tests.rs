//! Content Moderation Tests
//!
//! ## Test Scopes
//! - **Matching**: domain rules on URL/title, keyword rules on title/content.
//! - **Invariants**: order preservation, exact counts, idempotence.
//! - **Blocklist**: defaults, file parsing, empty list as no-op.

#[cfg(test)]
mod tests {
    use crate::moderation::{Blocklist, ContentModerator, WITHHELD_NOTICE};
    use crate::search::types::Document;

    fn doc(id: &str, title: &str, content: &str, url: &str) -> Document {
        Document {
            id: id.to_string(),
            title: title.to_string(),
            content: content.to_string(),
            url: url.to_string(),
            score: 1.0,
            ..Document::default()
        }
    }

    fn mixed_page() -> Vec<Document> {
        vec![
            doc("1", "Rust book", "ownership and borrowing", "https://doc.rust-lang.org"),
            doc("2", "Free stuff", "click here", "https://www.porn.com/page"),
            doc("3", "Tokio guide", "async runtime", "https://tokio.rs"),
            doc("4", "xxx deals", "cheap", "https://shop.example"),
            doc("5", "Axum", "web framework", "https://github.com/tokio-rs/axum"),
            doc("6", "Mirror of bad-content.org", "text", "https://mirror.example"),
        ]
    }

    fn ids(docs: &[Document]) -> Vec<&str> {
        docs.iter().map(|d| d.id.as_str()).collect()
    }

    // ============================================================
    // MATCHING RULES
    // ============================================================

    #[test]
    fn test_blocked_domain_in_url() {
        let moderator = ContentModerator::new(Blocklist::default());
        assert!(moderator.is_blocked(&doc("a", "title", "body", "http://adult.com/x")));
    }

    #[test]
    fn test_blocked_domain_in_title() {
        let moderator = ContentModerator::new(Blocklist::default());
        assert!(moderator.is_blocked(&doc("a", "visit xxx-test.net", "body", "http://ok.example")));
    }

    #[test]
    fn test_blocked_keyword_in_content() {
        let moderator = ContentModerator::new(Blocklist::default());
        assert!(moderator.is_blocked(&doc("a", "title", "网上赌博平台", "http://ok.example")));
    }

    #[test]
    fn test_keyword_in_url_only_is_not_blocked() {
        // keywords are checked against title and content, not the URL
        let moderator = ContentModerator::new(Blocklist::new(Vec::<String>::new(), ["casino"]));
        assert!(!moderator.is_blocked(&doc("a", "title", "body", "http://casino.example")));
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        let moderator = ContentModerator::new(Blocklist::default());

        assert!(!moderator.is_blocked(&doc("a", "XXX Movies", "PORN", "http://ok.example")));
        assert!(!moderator.is_blocked(&doc("b", "t", "c", "http://PORN.COM")));
    }

    // ============================================================
    // INVARIANTS
    // ============================================================

    #[test]
    fn test_moderate_removes_and_counts() {
        let moderator = ContentModerator::new(Blocklist::default());
        let input = mixed_page();
        let total = input.len();

        let outcome = moderator.moderate(input);

        assert_eq!(ids(&outcome.kept), vec!["1", "3", "5"]);
        assert_eq!(outcome.removed, 3);
        assert_eq!(outcome.kept.len() + outcome.removed, total);
        assert!(outcome.withheld_any());
    }

    #[test]
    fn test_moderate_preserves_relative_order() {
        let moderator = ContentModerator::new(Blocklist::default());
        let input = mixed_page();
        let original_ids: Vec<String> = input.iter().map(|d| d.id.clone()).collect();

        let outcome = moderator.moderate(input);

        // kept must be a subsequence of the input
        let mut cursor = original_ids.iter();
        for kept in &outcome.kept {
            assert!(
                cursor.any(|id| id == &kept.id),
                "{} appeared out of order",
                kept.id
            );
        }
    }

    #[test]
    fn test_moderate_is_idempotent() {
        let moderator = ContentModerator::new(Blocklist::default());

        let first = moderator.moderate(mixed_page());
        let second = moderator.moderate(first.kept.clone());

        assert_eq!(second.kept, first.kept);
        assert_eq!(second.removed, 0);
        assert!(!second.withheld_any());
    }

    #[test]
    fn test_empty_blocklist_is_noop() {
        let moderator = ContentModerator::new(Blocklist::empty());
        let input = mixed_page();

        let outcome = moderator.moderate(input.clone());

        assert_eq!(outcome.kept, input);
        assert_eq!(outcome.removed, 0);
    }

    #[test]
    fn test_empty_input() {
        let moderator = ContentModerator::new(Blocklist::default());
        let outcome = moderator.moderate(Vec::new());

        assert!(outcome.kept.is_empty());
        assert_eq!(outcome.removed, 0);
    }

    #[test]
    fn test_notice_is_fixed_text() {
        assert!(!WITHHELD_NOTICE.is_empty());
    }

    // ============================================================
    // BLOCKLIST CONSTRUCTION
    // ============================================================

    #[test]
    fn test_default_blocklist_contents() {
        let blocklist = Blocklist::default();

        assert!(blocklist.domains.contains(&"porn.com".to_string()));
        assert!(blocklist.keywords.contains(&"xxx".to_string()));
        assert!(!blocklist.is_empty());
    }

    #[test]
    fn test_blank_patterns_are_dropped() {
        let blocklist = Blocklist::new(["", "spam.example"], [""]);

        assert_eq!(blocklist.domains, vec!["spam.example".to_string()]);
        assert!(blocklist.keywords.is_empty());

        // an empty pattern would otherwise block everything
        let moderator = ContentModerator::new(blocklist);
        assert!(!moderator.is_blocked(&doc("a", "t", "c", "http://ok.example")));
    }

    #[test]
    fn test_blocklist_file_parsing() {
        let blocklist = Blocklist::parse(
            "# moderation rules\n\
             domain: spam.example\n\
             keyword:casino\n\
             \n\
             nonsense line\n\
             domain:\n",
        );

        assert_eq!(blocklist.domains, vec!["spam.example".to_string()]);
        assert_eq!(blocklist.keywords, vec!["casino".to_string()]);
    }

    #[test]
    fn test_custom_blocklist_substitution() {
        let moderator = ContentModerator::new(Blocklist::new(["tokio.rs"], ["borrowing"]));

        let outcome = moderator.moderate(mixed_page());

        assert_eq!(ids(&outcome.kept), vec!["2", "4", "5", "6"]);
        assert_eq!(outcome.removed, 2);
    }
}
