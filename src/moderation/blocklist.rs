use crate::error::{GatewayError, Result};
use std::path::Path;

const DEFAULT_DOMAINS: &[&str] = &[
    "example-adult-site.com",
    "bad-content.org",
    "xxx-test.net",
    "adult.com",
    "porn.com",
];

const DEFAULT_KEYWORDS: &[&str] = &["成人", "色情", "赌博", "xxx", "porn"];

/// Read-only moderation configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blocklist {
    pub domains: Vec<String>,
    pub keywords: Vec<String>,
}

impl Blocklist {
    pub fn new<D, K>(domains: D, keywords: K) -> Self
    where
        D: IntoIterator,
        D::Item: Into<String>,
        K: IntoIterator,
        K::Item: Into<String>,
    {
        // Empty patterns would match every document.
        Self {
            domains: domains
                .into_iter()
                .map(Into::into)
                .filter(|d: &String| !d.is_empty())
                .collect(),
            keywords: keywords
                .into_iter()
                .map(Into::into)
                .filter(|k: &String| !k.is_empty())
                .collect(),
        }
    }

    pub fn empty() -> Self {
        Self {
            domains: Vec::new(),
            keywords: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty() && self.keywords.is_empty()
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            GatewayError::Config(format!("cannot read blocklist {}: {}", path.display(), e))
        })?;
        let blocklist = Self::parse(&contents);
        tracing::info!(
            "Loaded blocklist from {}: {} domains, {} keywords",
            path.display(),
            blocklist.domains.len(),
            blocklist.keywords.len()
        );
        Ok(blocklist)
    }

    /// Parses `domain:<value>` / `keyword:<value>` lines. Anything else is
    /// ignored with a warning.
    pub fn parse(contents: &str) -> Self {
        let mut domains = Vec::new();
        let mut keywords = Vec::new();

        for line in contents.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match line.split_once(':') {
                Some(("domain", value)) => domains.push(value.trim().to_string()),
                Some(("keyword", value)) => keywords.push(value.trim().to_string()),
                _ => tracing::warn!("Ignoring unrecognized blocklist line: {}", line),
            }
        }

        Self::new(domains, keywords)
    }
}

impl Default for Blocklist {
    fn default() -> Self {
        Self::new(DEFAULT_DOMAINS.iter().copied(), DEFAULT_KEYWORDS.iter().copied())
    }
}
