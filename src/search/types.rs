use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{GatewayError, Result};
use crate::validation::{validate, validate_pagination};

/// A validated search request. Built once per request and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    raw: String,
    normalized: String,
    page: u32,
    size: u32,
}

impl Query {
    /// Runs the input validator over raw request parameters.
    pub fn parse(raw: &str, page_raw: Option<&str>, size_raw: Option<&str>) -> Result<Self> {
        let normalized = validate(raw).ok_or(GatewayError::InvalidQuery)?;
        let (page, size) = validate_pagination(page_raw, size_raw);

        Ok(Self {
            raw: raw.to_string(),
            normalized,
            page,
            size,
        })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Zero-based index of the first hit on this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.size)
    }
}

/// One entry of the full-text index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    /// Highlighted fragments per field, as returned by the index.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub highlights: BTreeMap<String, Vec<String>>,
}

/// One page of results for a query. This is the value stored in the cache.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub total: u64,
    pub hits: Vec<Document>,
    /// Backend-reported query time in milliseconds.
    pub took: u64,
    pub suggestions: Vec<String>,
}

/// Body of `GET /api/search`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(flatten)]
    pub result: SearchResult,
    pub filtered: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Query string of `GET /api/search`. Everything arrives as text so that
/// garbage pagination falls back to defaults instead of failing extraction.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub page: Option<String>,
    pub size: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct HotQueriesParams {
    pub n: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HotQueriesResponse {
    pub queries: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
