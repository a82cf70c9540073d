//! Shape validation for node input bags.

use crate::ConfigError;
use serde_json::{Map, Value};

/// Validate the top-level node data object.
pub(super) fn validate_node_data(value: &Value) -> Result<(), ConfigError> {
    let map = expect_object(value, "")?;
    ensure_allowed_keys(map, &["id", "label", "name", "inputs", "outputs"], "")?;
    if let Some(value) = map.get("inputs") {
        expect_object(value, "inputs")?;
    }
    if let Some(value) = map.get("outputs") {
        let outputs = expect_object(value, "outputs")?;
        if let Some(value) = outputs.get("output") {
            expect_string(value, "outputs.output")?;
        }
    }
    for key in ["id", "label", "name"] {
        if let Some(value) = map.get(key) {
            expect_string(value, key)?;
        }
    }
    Ok(())
}

fn expect_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>, ConfigError> {
    value
        .as_object()
        .ok_or_else(|| ConfigError::field(display_path(path), "expected object"))
}

fn expect_string(value: &Value, path: &str) -> Result<(), ConfigError> {
    if value.is_string() {
        Ok(())
    } else {
        Err(ConfigError::field(display_path(path), "expected string"))
    }
}

fn ensure_allowed_keys(
    map: &Map<String, Value>,
    allowed: &[&str],
    path: &str,
) -> Result<(), ConfigError> {
    for key in map.keys() {
        if !allowed.contains(&key.as_str()) {
            let full = if path.is_empty() {
                key.clone()
            } else {
                format!("{path}.{key}")
            };
            return Err(ConfigError::field(full, "unknown key"));
        }
    }
    Ok(())
}

fn display_path(path: &str) -> &str {
    if path.is_empty() { "<root>" } else { path }
}
