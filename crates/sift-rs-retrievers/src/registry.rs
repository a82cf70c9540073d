//! Registry for retriever node implementations.

use crate::date_filtered::DateFilteredRetriever;
use crate::error::RetrieverError;
use crate::node::RetrieverNode;
use crate::templated::TemplatedRetriever;
use log::{debug, warn};
use parking_lot::RwLock;
use sift_rs_protocol::NodeSpec;
use std::collections::HashMap;
use std::sync::Arc;

/// In-memory registry of nodes keyed by name.
#[derive(Default, Clone)]
pub struct NodeRegistry {
    nodes: Arc<RwLock<HashMap<String, Arc<dyn RetrieverNode>>>>,
}

impl NodeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node by name, replacing any node with the same name.
    ///
    /// The node's descriptor must carry the name it is registered under, since
    /// hosts look nodes up by descriptor name.
    pub fn register(&self, node: Arc<dyn RetrieverNode>) -> Result<(), RetrieverError> {
        let spec_name = node.spec().name;
        if spec_name != node.name() {
            warn!(
                "rejecting node with mismatched descriptor (name={}, spec_name={spec_name})",
                node.name()
            );
            return Err(RetrieverError::NameMismatch {
                name: node.name().to_string(),
                spec_name,
            });
        }
        debug!("registering node (name={})", node.name());
        if let Some(previous) = self.nodes.write().insert(spec_name, node) {
            debug!("replaced node (name={})", previous.name());
        }
        Ok(())
    }

    /// Fetch a node by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn RetrieverNode>> {
        self.nodes.read().get(name).cloned()
    }

    /// Registered node names, sorted.
    pub fn list(&self) -> Vec<String> {
        let mut names = self.nodes.read().keys().cloned().collect::<Vec<_>>();
        names.sort();
        names
    }

    /// Descriptors for all registered nodes, sorted by name.
    pub fn specs(&self) -> Vec<NodeSpec> {
        let mut specs = self
            .nodes
            .read()
            .values()
            .map(|node| node.spec())
            .collect::<Vec<_>>();
        specs.sort_by(|left, right| left.name.cmp(&right.name));
        specs
    }
}

/// Register the built-in retrievers into `registry`.
pub fn register_builtin_nodes(registry: &NodeRegistry) -> Result<(), RetrieverError> {
    registry.register(Arc::new(TemplatedRetriever::new()))?;
    registry.register(Arc::new(DateFilteredRetriever::new()))?;
    Ok(())
}

/// Registry preloaded with the built-in retrievers.
pub fn builtin_node_registry() -> Result<NodeRegistry, RetrieverError> {
    let registry = NodeRegistry::new();
    register_builtin_nodes(&registry)?;
    Ok(registry)
}
