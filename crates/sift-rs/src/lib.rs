//! Public SDK surface for Sift.
//!
//! This crate re-exports the retriever building blocks and provides a small
//! initialization helper to keep consumer setup consistent.

/// Re-export for convenience.
pub use sift_rs_config as config;
/// Re-export for convenience.
pub use sift_rs_protocol as protocol;
/// Re-export for convenience.
pub use sift_rs_retrievers as retrievers;

pub use sift_rs_config::NodeData;
pub use sift_rs_protocol::{NodeOutput, OutputPort, Record, VectorStore};
pub use sift_rs_retrievers::{
    DateFilteredRetriever, NodeHandles, NodeRegistry, RetrieverError, RetrieverNode,
    TemplatedRetriever, builtin_node_registry,
};

#[inline]
/// Initialize logging using env_logger if the "logging" feature is enabled.
///
/// This is a no-op if the feature is not enabled. Binaries are still expected
/// to call this early in startup to ensure log output is wired up.
pub fn init_logging() {
    #[cfg(feature = "logging")]
    {
        let _ = env_logger::try_init();
    }
    log::debug!("sift logging initialized");
}
