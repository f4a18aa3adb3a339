use std::sync::Arc;
use std::time::Duration;

use xxhash_rust::xxh3::xxh3_64;

use super::suggest::suggest;
use super::tokenizer::tokenize_query;
use super::types::{Document, Query, SearchResult};
use crate::backend::{BackendQuery, FieldBoost, SearchBackend};
use crate::cache::{CacheAside, WriteBackJob, HOT_QUERIES_SET};
use crate::error::Result;

/// Fields matched by every query, with their relevance boosts.
const SEARCH_FIELDS: [(&str, f32); 2] = [("title", 3.0), ("content", 1.0)];
const HIGHLIGHT_FIELDS: [&str; 2] = ["title", "content"];

/// Query orchestrator: cache-aside lookups in front of the index backend.
pub struct SearchService {
    backend: Arc<dyn SearchBackend>,
    cache: CacheAside,
    cache_ttl: Duration,
}

impl SearchService {
    pub fn new(backend: Arc<dyn SearchBackend>, cache: CacheAside, cache_ttl: Duration) -> Self {
        Self {
            backend,
            cache,
            cache_ttl,
        }
    }

    /// Deterministic cache key for a validated query.
    ///
    /// The normalized text is hashed so keys stay short and free of
    /// separator characters whatever the user typed.
    pub fn cache_key(query: &Query) -> String {
        format!(
            "search:{:016x}:{}:{}",
            xxh3_64(query.normalized().as_bytes()),
            query.page(),
            query.size()
        )
    }

    pub fn backend_query(query: &Query) -> BackendQuery {
        BackendQuery {
            terms: tokenize_query(query.normalized()),
            fields: SEARCH_FIELDS
                .iter()
                .map(|(field, boost)| FieldBoost::new(field, *boost))
                .collect(),
            from: query.offset(),
            size: query.size(),
            highlight_fields: HIGHLIGHT_FIELDS.iter().map(|f| f.to_string()).collect(),
        }
    }

    /// Returns one page of results, from the cache when possible.
    ///
    /// Backend failures are returned to the caller untouched; translating
    /// them into something safe to show is the HTTP layer's job.
    pub async fn search(&self, query: &Query) -> Result<SearchResult> {
        let key = Self::cache_key(query);

        let result = self
            .cache
            .get_or_fetch(&key, self.cache_ttl, || self.fetch(query))
            .await
            .map_err(|e| {
                tracing::error!("Search failed for {:?}: {}", query.normalized(), e);
                e
            })?;

        self.cache.write_back().enqueue(WriteBackJob::IncrSorted {
            set: HOT_QUERIES_SET.to_string(),
            member: query.normalized().to_string(),
        });

        Ok(result)
    }

    async fn fetch(&self, query: &Query) -> Result<SearchResult> {
        let page = self.backend.search(&Self::backend_query(query)).await?;

        Ok(SearchResult {
            total: page.total,
            hits: page.hits,
            took: page.took,
            suggestions: suggest(query.normalized()),
        })
    }

    pub async fn index_document(&self, document: &Document) -> Result<()> {
        self.backend.index(document).await.map_err(|e| {
            tracing::error!("Indexing document {} failed: {}", document.id, e);
            e
        })
    }

    /// Most searched queries, best first. Cache faults yield an empty list.
    pub async fn hot_queries(&self, n: usize) -> Vec<String> {
        match self.cache.store().top_n(HOT_QUERIES_SET, n).await {
            Ok(queries) => queries,
            Err(e) => {
                tracing::warn!("Failed to read hot queries: {}", e);
                Vec::new()
            }
        }
    }
}
