//! Retriever nodes for Sift.
//!
//! Two nodes are provided: a templated retriever that renders a prompt and a
//! metadata filter before querying a vector store, and a date-filtered
//! retriever that asks a language model which records are current.

pub mod date_filtered;
pub mod error;
pub mod escape;
pub mod field_path;
pub mod llm;
pub mod meta_filter;
pub mod node;
pub mod output;
pub mod registry;
pub mod template;
pub mod templated;

/// Date-filtered retriever and its resolved query.
pub use date_filtered::{DATE_FILTERED_RETRIEVER, DateFilteredQuery, DateFilteredRetriever};
/// Error type returned by retriever runs.
pub use error::RetrieverError;
/// Escape normalization for rendered text.
pub use escape::handle_escape_characters;
/// Declarative field paths into records.
pub use field_path::{FieldPath, FieldPathError};
/// Single-prompt model invocation.
pub use llm::invoke_model;
/// Metadata filter templates.
pub use meta_filter::MetaFilterTemplate;
/// Node contract and host-supplied handles.
pub use node::{NodeHandles, RetrieverNode};
/// Output shaping for the document and text ports.
pub use output::{records_to_text, shape_output};
/// Node registry and built-in registration.
pub use registry::{NodeRegistry, builtin_node_registry, register_builtin_nodes};
/// Prompt template rendering.
pub use template::PromptTemplate;
/// Templated retriever and its resolved query.
pub use templated::{TEMPLATED_RETRIEVER, TemplatedQuery, TemplatedRetriever};
