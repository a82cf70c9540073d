//! Test helpers shared across Sift crates.

pub mod llm;
pub mod records;
pub mod vector_store;

pub use llm::{FailingLLM, FixedChatResponse, RecordingLLM, ScriptedLLM};
pub use records::{document, documents_from, records_json};
pub use vector_store::{FailingVectorStore, SearchCall, StubVectorStore};
