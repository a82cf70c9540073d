//! Loading and typed access for the node input bag.
//!
//! The bag has the host's shape: `{ inputs: { ... }, outputs: { output: "text" } }`.
//! JSON-typed parameters arrive either already structured or as JSON text,
//! number parameters either as numbers or numeric text.

mod schema;


use crate::ConfigError;
use log::{debug, info};
use serde_json::{Map, Value};
use sift_rs_protocol::OutputPort;
use std::fs;
use std::path::Path;

/// Parameters and selected output port for a single node run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeData {
    /// Resolved input parameters keyed by parameter name.
    inputs: Map<String, Value>,
    /// Selected output port name.
    output: Option<String>,
}

impl NodeData {
    /// Create an empty input bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load an input bag from JSON5 contents.
    pub fn load_from_str(contents: &str) -> Result<Self, ConfigError> {
        debug!("loading node data from raw contents (len={})", contents.len());
        let value: Value = json5::from_str(contents)?;
        Self::from_value(value)
    }

    /// Load an input bag from a JSON5 file.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!("loading node data (path={})", path.display());
        let contents = fs::read_to_string(path)?;
        Self::load_from_str(&contents)
    }

    /// Build an input bag from an already parsed value.
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        schema::validate_node_data(&value)?;
        let Value::Object(mut map) = value else {
            return Err(ConfigError::Invalid("node data must be an object".to_string()));
        };
        let inputs = match map.remove("inputs") {
            Some(Value::Object(inputs)) => inputs,
            _ => Map::new(),
        };
        let output = map
            .remove("outputs")
            .and_then(|outputs| outputs.get("output").cloned())
            .and_then(|output| output.as_str().map(str::to_string));
        Ok(Self { inputs, output })
    }

    /// Set an input parameter.
    pub fn with_input(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.inputs.insert(name.into(), value.into());
        self
    }

    /// Select the output port by name.
    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into());
        self
    }

    /// Raw input value; absent and null inputs both read as `None`.
    pub fn input(&self, name: &str) -> Option<&Value> {
        self.inputs.get(name).filter(|value| !value.is_null())
    }

    /// All inputs in insertion order.
    pub fn inputs(&self) -> &Map<String, Value> {
        &self.inputs
    }

    /// Selected output port name.
    pub fn output(&self) -> Option<&str> {
        self.output.as_deref()
    }

    /// Selected output port, when it is one the retrievers serve.
    pub fn output_port(&self) -> Option<OutputPort> {
        self.output().and_then(OutputPort::parse)
    }

    /// Read a string parameter. Numbers and booleans are rendered as text.
    pub fn string(&self, name: &str) -> Result<Option<String>, ConfigError> {
        match self.input(name) {
            None => Ok(None),
            Some(Value::String(value)) => Ok(Some(value.clone())),
            Some(value @ (Value::Number(_) | Value::Bool(_))) => Ok(Some(value.to_string())),
            Some(_) => Err(ConfigError::field(name, "expected a string")),
        }
    }

    /// Read a JSON parameter: structured values pass through, strings are
    /// parsed as strict JSON. Empty strings read as absent.
    pub fn json_value(&self, name: &str) -> Result<Option<Value>, ConfigError> {
        match self.input(name) {
            None => Ok(None),
            Some(Value::String(text)) if text.is_empty() => Ok(None),
            Some(Value::String(text)) => serde_json::from_str(text)
                .map(Some)
                .map_err(|err| ConfigError::field(name, err.to_string())),
            Some(value) => Ok(Some(value.clone())),
        }
    }

    /// Read a JSON parameter that must be an object.
    pub fn json_object(&self, name: &str) -> Result<Option<Map<String, Value>>, ConfigError> {
        match self.json_value(name)? {
            None => Ok(None),
            Some(Value::Object(map)) => Ok(Some(map)),
            Some(_) => Err(ConfigError::field(name, "expected a JSON object")),
        }
    }

    /// Read a parameter written as a JSON5 object literal. Structured values
    /// pass through unchanged.
    pub fn json5_value(&self, name: &str) -> Result<Option<Value>, ConfigError> {
        match self.input(name) {
            None => Ok(None),
            Some(Value::String(text)) if text.trim().is_empty() => Ok(None),
            Some(Value::String(text)) => json5::from_str(text)
                .map(Some)
                .map_err(|err| ConfigError::field(name, err.to_string())),
            Some(value) => Ok(Some(value.clone())),
        }
    }

    /// Read a count parameter, falling back to `default` when the input is
    /// absent, null or an empty string. Numeric text is read like `parseInt`:
    /// leading whitespace is skipped and parsing stops at the first non-digit.
    pub fn usize_or(&self, name: &str, default: usize) -> Result<usize, ConfigError> {
        match self.input(name) {
            None => Ok(default),
            Some(Value::String(text)) if text.trim().is_empty() => Ok(default),
            Some(Value::String(text)) => parse_leading_integer(text)
                .ok_or_else(|| ConfigError::field(name, format!("expected a count, got {text:?}"))),
            Some(Value::Number(number)) => number
                .as_u64()
                .map(|value| value as usize)
                .or_else(|| {
                    number
                        .as_f64()
                        .filter(|value| value.is_finite() && *value >= 0.0)
                        .map(|value| value.trunc() as usize)
                })
                .ok_or_else(|| ConfigError::field(name, format!("expected a count, got {number}"))),
            Some(_) => Err(ConfigError::field(name, "expected a number")),
        }
    }
}

/// Parse the leading unsigned integer of a string, `parseInt` style.
fn parse_leading_integer(text: &str) -> Option<usize> {
    let trimmed = text.trim_start();
    let trimmed = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let digits: String = trimmed.chars().take_while(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}
