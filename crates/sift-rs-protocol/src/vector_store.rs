//! Vector store interface consumed by the templated retriever.

use crate::Record;
use async_trait::async_trait;
use serde_json::Value;

/// Errors surfaced by vector store implementations.
#[derive(Debug, thiserror::Error)]
pub enum VectorStoreError {
    /// The similarity search failed.
    #[error("similarity search failed: {0}")]
    SearchFailed(String),
}

/// Similarity search over an externally owned vector store.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Return up to `k` records most relevant to `query`, constrained by
    /// `filter` (an object such as `{"metadata": {...}}`).
    async fn similarity_search(
        &self,
        query: &str,
        k: usize,
        filter: &Value,
    ) -> Result<Vec<Record>, VectorStoreError>;

    /// Store name for logging.
    fn name(&self) -> &str {
        "vector_store"
    }
}
