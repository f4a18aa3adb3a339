use super::blocklist::Blocklist;
use crate::search::types::Document;

/// Notice attached to a response whenever at least one hit was withheld.
pub const WITHHELD_NOTICE: &str =
    "Some search results have been withheld in accordance with applicable laws and regulations.";

/// Result of moderating one page of hits.
///
/// `kept.len() + removed` always equals the input length, and `kept` keeps the
/// input order.
#[derive(Debug, Clone, PartialEq)]
pub struct ModerationOutcome {
    pub kept: Vec<Document>,
    pub removed: usize,
}

impl ModerationOutcome {
    pub fn withheld_any(&self) -> bool {
        self.removed > 0
    }
}

#[derive(Debug, Clone)]
pub struct ContentModerator {
    blocklist: Blocklist,
}

impl ContentModerator {
    pub fn new(blocklist: Blocklist) -> Self {
        Self { blocklist }
    }

    pub fn blocklist(&self) -> &Blocklist {
        &self.blocklist
    }

    pub fn moderate(&self, documents: Vec<Document>) -> ModerationOutcome {
        let total = documents.len();
        let kept: Vec<Document> = documents
            .into_iter()
            .filter(|doc| !self.is_blocked(doc))
            .collect();

        ModerationOutcome {
            removed: total - kept.len(),
            kept,
        }
    }

    pub fn is_blocked(&self, doc: &Document) -> bool {
        let domain_hit = self
            .blocklist
            .domains
            .iter()
            .any(|domain| doc.url.contains(domain.as_str()) || doc.title.contains(domain.as_str()));

        domain_hit
            || self.blocklist.keywords.iter().any(|keyword| {
                doc.title.contains(keyword.as_str()) || doc.content.contains(keyword.as_str())
            })
    }
}
