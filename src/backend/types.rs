use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use crate::search::types::Document;

/// A field to match against and its relevance boost.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldBoost {
    pub field: String,
    pub boost: f32,
}

impl FieldBoost {
    pub fn new(field: &str, boost: f32) -> Self {
        Self {
            field: field.to_string(),
            boost,
        }
    }

    /// `title^3` style notation; a boost of 1 is left implicit.
    pub fn to_query_field(&self) -> String {
        if (self.boost - 1.0).abs() < f32::EPSILON {
            self.field.clone()
        } else {
            format!("{}^{}", self.field, self.boost)
        }
    }
}

/// Backend-neutral description of one page of a ranked query.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendQuery {
    pub terms: Vec<String>,
    pub fields: Vec<FieldBoost>,
    pub from: u64,
    pub size: u32,
    pub highlight_fields: Vec<String>,
}

/// What the backend returned for a [`BackendQuery`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BackendPage {
    pub total: u64,
    pub hits: Vec<Document>,
    pub took: u64,
}

// --- Elasticsearch wire format ---

#[derive(Debug, Deserialize)]
pub(crate) struct EsSearchResponse {
    #[serde(default)]
    pub took: u64,
    pub hits: EsHits,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EsHits {
    pub total: EsTotal,
    #[serde(default)]
    pub hits: Vec<EsHit>,
}

/// `hits.total` is an object since ES 7 and a bare number before that.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum EsTotal {
    Object { value: u64 },
    Count(u64),
}

impl EsTotal {
    pub fn value(&self) -> u64 {
        match self {
            EsTotal::Object { value } => *value,
            EsTotal::Count(count) => *count,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct EsHit {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_score", default)]
    pub score: Option<f64>,
    #[serde(rename = "_source", default)]
    pub source: EsSource,
    #[serde(default)]
    pub highlight: BTreeMap<String, Vec<String>>,
}

impl From<EsHit> for Document {
    fn from(hit: EsHit) -> Self {
        Document {
            id: hit.id,
            title: hit.source.title,
            content: hit.source.content,
            url: hit.source.url,
            score: hit.score.unwrap_or_default(),
            timestamp: hit.source.timestamp,
            highlights: hit.highlight,
        }
    }
}

/// Stored fields of an indexed document.
#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct EsSource {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub url: String,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<DateTime<Utc>>,
}

impl From<&Document> for EsSource {
    fn from(doc: &Document) -> Self {
        EsSource {
            title: doc.title.clone(),
            content: doc.content.clone(),
            url: doc.url.clone(),
            timestamp: doc.timestamp,
        }
    }
}

/// Documents indexed by other tools may carry timestamps in other formats;
/// those are dropped instead of failing the whole page.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(|v| v.as_str())
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc)))
}
