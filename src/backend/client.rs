use async_trait::async_trait;

use super::types::{BackendPage, BackendQuery};
use crate::error::Result;
use crate::search::types::Document;

/// Operations the gateway consumes from the full-text index.
///
/// Implementations are long-lived, shared across request tasks and must be
/// safe for concurrent use.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Runs a ranked query. Hits come back in relevance order.
    async fn search(&self, query: &BackendQuery) -> Result<BackendPage>;

    /// Inserts or replaces a document keyed by its `id`.
    async fn index(&self, document: &Document) -> Result<()>;
}
