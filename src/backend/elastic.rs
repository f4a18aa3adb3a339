use async_trait::async_trait;
use rand::Rng;
use serde_json::{json, Value};
use std::time::Duration;

use super::client::SearchBackend;
use super::types::{BackendPage, BackendQuery, EsSearchResponse, EsSource};
use crate::error::{GatewayError, Result};
use crate::search::tokenizer::join_terms;
use crate::search::types::Document;

/// Cap on how much of an error body is kept for logging.
const ERROR_BODY_LIMIT: usize = 512;

/// Elasticsearch over its REST API.
pub struct ElasticsearchBackend {
    http_client: reqwest::Client,
    base_url: String,
    index: String,
    timeout: Duration,
    attempts: usize,
}

impl ElasticsearchBackend {
    pub fn new(base_url: &str, index: &str, timeout: Duration) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            index: index.to_string(),
            timeout,
            attempts: 1,
        }
    }

    /// Transport attempts per request. Only connection-level failures are
    /// retried; an error status from the index is returned as is.
    pub fn with_attempts(mut self, attempts: usize) -> Self {
        self.attempts = attempts.max(1);
        self
    }

    pub fn search_url(&self) -> String {
        format!("{}/{}/_search", self.base_url, self.index)
    }

    pub fn document_url(&self, id: &str) -> String {
        format!(
            "{}/{}/_doc/{}?refresh=true",
            self.base_url,
            self.index,
            urlencoding::encode(id)
        )
    }

    /// Request body for a ranked multi-field query with highlighting.
    pub fn build_search_body(query: &BackendQuery) -> Value {
        let fields: Vec<String> = query.fields.iter().map(|f| f.to_query_field()).collect();
        let highlight: serde_json::Map<String, Value> = query
            .highlight_fields
            .iter()
            .map(|field| (field.clone(), json!({})))
            .collect();

        json!({
            "from": query.from,
            "size": query.size,
            "track_total_hits": true,
            "query": {
                "multi_match": {
                    "query": join_terms(&query.terms),
                    "fields": fields,
                }
            },
            "highlight": { "fields": highlight },
        })
    }

    async fn send_with_retry(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let mut delay_ms = 150u64;

        for attempt in 0..self.attempts {
            let Some(builder) = request.try_clone() else {
                return Ok(request.timeout(self.timeout).send().await?);
            };

            match builder.timeout(self.timeout).send().await {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    if attempt + 1 == self.attempts {
                        return Err(e.into());
                    }
                    tracing::warn!(
                        "Backend request failed (attempt {}/{}): {}",
                        attempt + 1,
                        self.attempts,
                        e
                    );
                    let jitter: u64 = rand::thread_rng().gen_range(0..50);
                    tokio::time::sleep(Duration::from_millis(delay_ms + jitter)).await;
                    delay_ms = (delay_ms * 2).min(1200);
                }
            }
        }

        Err(GatewayError::BackendUnavailable(
            "retry attempts exhausted".to_string(),
        ))
    }

    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let mut body = response.text().await.unwrap_or_default();
        if body.len() > ERROR_BODY_LIMIT {
            let cut = (0..=ERROR_BODY_LIMIT)
                .rev()
                .find(|&i| body.is_char_boundary(i))
                .unwrap_or(0);
            body.truncate(cut);
        }

        Err(GatewayError::BackendStatus {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl SearchBackend for ElasticsearchBackend {
    async fn search(&self, query: &BackendQuery) -> Result<BackendPage> {
        let body = Self::build_search_body(query);
        let request = self.http_client.post(self.search_url()).json(&body);

        let response = Self::ensure_success(self.send_with_retry(request).await?).await?;
        let bytes = response.bytes().await?;
        let parsed: EsSearchResponse = serde_json::from_slice(&bytes)
            .map_err(|e| GatewayError::BackendDecode(e.to_string()))?;

        let page = BackendPage {
            total: parsed.hits.total.value(),
            took: parsed.took,
            hits: parsed.hits.hits.into_iter().map(Document::from).collect(),
        };

        tracing::debug!(
            "Backend returned {} of {} hits in {}ms",
            page.hits.len(),
            page.total,
            page.took
        );
        Ok(page)
    }

    async fn index(&self, document: &Document) -> Result<()> {
        let request = self
            .http_client
            .put(self.document_url(&document.id))
            .json(&EsSource::from(document));

        Self::ensure_success(self.send_with_retry(request).await?).await?;
        tracing::info!("Indexed document {}", document.id);
        Ok(())
    }
}
