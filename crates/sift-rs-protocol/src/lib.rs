//! Shared types for Sift retriever nodes: records, output ports, node
//! descriptors and the vector store interface.

mod node;
mod record;
mod vector_store;

pub use node::{InputParam, NodeSpec, OutputSpec, ParamKind};
pub use record::Record;
pub use vector_store::{VectorStore, VectorStoreError};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Output port selected by the host for a node run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputPort {
    /// Raw record list.
    Document,
    /// Concatenated page content.
    Text,
}

impl OutputPort {
    /// Port name as used in node graphs.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputPort::Document => "document",
            OutputPort::Text => "text",
        }
    }

    /// Parse a port name, returning `None` for ports the retrievers do not serve.
    pub fn parse(name: &str) -> Option<Self> {
        name.parse().ok()
    }
}

impl fmt::Display for OutputPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputPort {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "document" => Ok(OutputPort::Document),
            "text" => Ok(OutputPort::Text),
            other => Err(format!("unknown output port: {other}")),
        }
    }
}

/// Value returned from a node run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "value")]
pub enum NodeOutput {
    /// Records for the `document` port.
    Documents(Vec<Record>),
    /// Text for the `text` port.
    Text(String),
    /// No value; the selected port is not served by the node.
    Empty,
}

impl NodeOutput {
    /// Records carried by the output, if any.
    pub fn documents(&self) -> Option<&[Record]> {
        match self {
            NodeOutput::Documents(records) => Some(records),
            _ => None,
        }
    }

    /// Text carried by the output, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            NodeOutput::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, NodeOutput::Empty)
    }
}
