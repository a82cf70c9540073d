//! Error types for retriever runs.

use sift_rs_config::ConfigError;
use sift_rs_protocol::VectorStoreError;
use thiserror::Error;

/// Errors returned by retriever nodes and the node registry.
#[derive(Debug, Error)]
pub enum RetrieverError {
    /// Node inputs could not be read.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    /// A JSON-typed input could not be parsed.
    #[error("invalid JSON in {node} input {input}: {message}")]
    InvalidJson {
        node: &'static str,
        input: &'static str,
        message: String,
    },
    /// A required input or handle was not supplied.
    #[error("{node} requires input {input}")]
    MissingInput {
        node: &'static str,
        input: &'static str,
    },
    /// Input data or model output had the wrong shape.
    #[error("invalid data in {node}: {message}")]
    InvalidData { node: &'static str, message: String },
    /// A node was registered under a name its descriptor does not carry.
    #[error("node {name} describes itself as {spec_name}")]
    NameMismatch { name: String, spec_name: String },
    /// The vector store search failed.
    #[error("vector store error: {0}")]
    VectorStore(#[from] VectorStoreError),
    /// The language model call failed.
    #[error("llm error: {0}")]
    Llm(String),
}

impl RetrieverError {
    /// Map a config accessor failure onto the JSON error for a named input.
    pub(crate) fn invalid_json(node: &'static str, input: &'static str, err: ConfigError) -> Self {
        let message = match err {
            ConfigError::InvalidField { message, .. } => message,
            other => other.to_string(),
        };
        RetrieverError::InvalidJson {
            node,
            input,
            message,
        }
    }
}
