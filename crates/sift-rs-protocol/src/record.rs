//! Opaque record passed between retrievers and the host.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Field holding the free-form document body.
pub const PAGE_CONTENT_FIELD: &str = "pageContent";
/// Field holding the free-form metadata mapping.
pub const METADATA_FIELD: &str = "metadata";

/// A retrievable item. Records are opaque JSON values; document-like records
/// carry `pageContent` and `metadata` fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Value);

impl Record {
    /// Wrap an arbitrary JSON value.
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Build a document-like record.
    pub fn document(page_content: impl Into<String>, metadata: Value) -> Self {
        Self(json!({
            PAGE_CONTENT_FIELD: page_content.into(),
            METADATA_FIELD: metadata,
        }))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// Raw `pageContent` value, if present.
    pub fn page_content(&self) -> Option<&Value> {
        self.0.get(PAGE_CONTENT_FIELD)
    }

    /// `pageContent` rendered as text: strings verbatim, other JSON values in
    /// compact form, absent or null content as an empty string.
    pub fn page_content_text(&self) -> String {
        match self.page_content() {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
        }
    }

    /// Metadata mapping, if present and an object.
    pub fn metadata(&self) -> Option<&Map<String, Value>> {
        self.0.get(METADATA_FIELD).and_then(Value::as_object)
    }
}

impl From<Value> for Record {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        record.0
    }
}
