//! Node contract between the host and retriever implementations.

use crate::error::RetrieverError;
use async_trait::async_trait;
use autoagents_llm::LLMProvider;
use sift_rs_config::NodeData;
use sift_rs_protocol::{NodeOutput, NodeSpec, OutputSpec, VectorStore};
use std::fmt;
use std::sync::Arc;

/// Externally owned handles wired into a node by the host.
#[derive(Clone, Default)]
pub struct NodeHandles {
    /// Vector store connected to the node, if any.
    pub vector_store: Option<Arc<dyn VectorStore>>,
    /// Language model connected to the node, if any.
    pub model: Option<Arc<dyn LLMProvider>>,
}

impl NodeHandles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vector_store(mut self, vector_store: Arc<dyn VectorStore>) -> Self {
        self.vector_store = Some(vector_store);
        self
    }

    pub fn with_model(mut self, model: Arc<dyn LLMProvider>) -> Self {
        self.model = Some(model);
        self
    }
}

impl fmt::Debug for NodeHandles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeHandles")
            .field(
                "vector_store",
                &self.vector_store.as_ref().map(|store| store.name().to_string()),
            )
            .field("model", &self.model.is_some())
            .finish()
    }
}

/// Interface for retriever nodes run by the host.
#[async_trait]
pub trait RetrieverNode: Send + Sync {
    /// Registered node name.
    fn name(&self) -> &str;

    /// Descriptor presented to the host.
    fn spec(&self) -> NodeSpec;

    /// Run the node once with resolved inputs and handles.
    async fn run(&self, data: &NodeData, handles: &NodeHandles)
    -> Result<NodeOutput, RetrieverError>;
}

/// Output ports shared by both retrievers.
pub(crate) fn retriever_outputs() -> Vec<OutputSpec> {
    vec![
        OutputSpec {
            label: "Document".to_string(),
            name: "document".to_string(),
            description: "Array of document objects containing metadata and pageContent"
                .to_string(),
            base_classes: vec!["Document".to_string(), "json".to_string()],
        },
        OutputSpec {
            label: "Text".to_string(),
            name: "text".to_string(),
            description: "Concatenated string from pageContent of documents".to_string(),
            base_classes: vec!["string".to_string(), "json".to_string()],
        },
    ]
}
