//! Host input bag for retriever nodes.
//!
//! A node run receives the parameters resolved from the node graph plus the
//! selected output port. This crate loads that bag from JSON5 and exposes
//! typed accessors that mirror how the host encodes string, JSON and number
//! parameters.

mod error;
mod loader;

/// Public error type returned by input loading and typed accessors.
pub use error::ConfigError;
/// Node input bag.
pub use loader::NodeData;
