//! Prompt templates with `{name}` placeholders.
//!
//! Substitution is literal: every occurrence of `{key}` is replaced, nothing
//! is escaped, and values inserted by one substitution are visible to later
//! ones. Mapping iteration order therefore decides the result when names
//! overlap.

use serde_json::{Map, Value};
use std::borrow::Cow;

/// Default prompt for both retrievers.
pub const DEFAULT_PROMPT: &str = "{question}";

/// A prompt being resolved against substitution values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    text: String,
}

impl PromptTemplate {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Replace every `{key}` with `value`.
    pub fn substitute(&mut self, key: &str, value: &Value) {
        let placeholder = format!("{{{key}}}");
        if self.text.contains(&placeholder) {
            self.text = self.text.replace(&placeholder, &value_text(value));
        }
    }

    /// Apply every pair of `values` in iteration order.
    pub fn substitute_all(&mut self, values: &Map<String, Value>) {
        for (key, value) in values {
            self.substitute(key, value);
        }
    }

    /// Apply `values` and return the resolved prompt.
    pub fn render(mut self, values: &Map<String, Value>) -> String {
        self.substitute_all(values);
        self.text
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_PROMPT)
    }
}

/// Text inserted for a substitution value: strings verbatim, everything else
/// as compact JSON.
pub fn value_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(text) => Cow::Borrowed(text),
        other => Cow::Owned(other.to_string()),
    }
}
