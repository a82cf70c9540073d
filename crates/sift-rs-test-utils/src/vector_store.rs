use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use sift_rs_protocol::{Record, VectorStore, VectorStoreError};
use std::sync::Arc;

/// Arguments of one similarity search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchCall {
    pub query: String,
    pub k: usize,
    pub filter: Value,
}

/// Store that answers every search with the same records, truncated to `k`,
/// and records the calls it receives.
#[derive(Debug, Clone)]
pub struct StubVectorStore {
    records: Vec<Record>,
    calls: Arc<Mutex<Vec<SearchCall>>>,
}

impl StubVectorStore {
    pub fn new(records: Vec<Record>) -> (Self, Arc<Mutex<Vec<SearchCall>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                records,
                calls: calls.clone(),
            },
            calls,
        )
    }
}

#[async_trait]
impl VectorStore for StubVectorStore {
    async fn similarity_search(
        &self,
        query: &str,
        k: usize,
        filter: &Value,
    ) -> Result<Vec<Record>, VectorStoreError> {
        self.calls.lock().push(SearchCall {
            query: query.to_string(),
            k,
            filter: filter.clone(),
        });
        Ok(self.records.iter().take(k).cloned().collect())
    }

    fn name(&self) -> &str {
        "stub"
    }
}

#[derive(Debug, Clone)]
pub struct FailingVectorStore {
    message: String,
}

impl FailingVectorStore {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl VectorStore for FailingVectorStore {
    async fn similarity_search(
        &self,
        _query: &str,
        _k: usize,
        _filter: &Value,
    ) -> Result<Vec<Record>, VectorStoreError> {
        Err(VectorStoreError::SearchFailed(self.message.clone()))
    }

    fn name(&self) -> &str {
        "failing"
    }
}
