//! Metadata-filter templates.
//!
//! A template is a nested mapping whose string leaves name keys of a flat
//! data mapping (`"{field}"`). Resolving it produces the metadata filter sent
//! to the vector store.

use log::debug;
use serde_json::{Map, Value};

/// Parsed metadata-filter template.
#[derive(Debug, Clone, PartialEq)]
pub enum MetaFilterTemplate {
    /// Placeholder reference such as `{field}`.
    Placeholder(String),
    /// Mapping of child templates, in source order.
    Object(Vec<(String, MetaFilterTemplate)>),
    /// Sequence of child templates.
    Array(Vec<MetaFilterTemplate>),
    /// Non-string scalar kept as written.
    Literal(Value),
}

impl MetaFilterTemplate {
    /// Build the tree from a parsed template value.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::String(reference) => MetaFilterTemplate::Placeholder(reference),
            Value::Object(map) => MetaFilterTemplate::Object(
                map.into_iter()
                    .map(|(key, child)| (key, MetaFilterTemplate::from_value(child)))
                    .collect(),
            ),
            Value::Array(items) => MetaFilterTemplate::Array(
                items.into_iter().map(MetaFilterTemplate::from_value).collect(),
            ),
            scalar => MetaFilterTemplate::Literal(scalar),
        }
    }

    /// Resolve every placeholder against `data`.
    pub fn resolve(&self, data: &Map<String, Value>) -> Value {
        match self {
            MetaFilterTemplate::Placeholder(reference) => resolve_placeholder(reference, data),
            MetaFilterTemplate::Object(children) => Value::Object(
                children
                    .iter()
                    .map(|(key, child)| (key.clone(), child.resolve(data)))
                    .collect(),
            ),
            MetaFilterTemplate::Array(children) => {
                Value::Array(children.iter().map(|child| child.resolve(data)).collect())
            }
            MetaFilterTemplate::Literal(value) => value.clone(),
        }
    }
}

/// Key named by a placeholder: one leading `{` and one trailing `}` removed.
pub fn placeholder_key(reference: &str) -> &str {
    let key = reference.strip_prefix('{').unwrap_or(reference);
    key.strip_suffix('}').unwrap_or(key)
}

/// Resolve one leaf. Absent or null data yields null; string data is parsed
/// as JSON and yields null when it is not JSON; other data keeps its type.
fn resolve_placeholder(reference: &str, data: &Map<String, Value>) -> Value {
    let key = placeholder_key(reference);
    match data.get(key) {
        None | Some(Value::Null) => Value::Null,
        Some(Value::String(text)) => match serde_json::from_str(text) {
            Ok(value) => value,
            Err(err) => {
                debug!("meta filter value is not JSON (key={key}, error={err})");
                Value::Null
            }
        },
        Some(value) => value.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::{MetaFilterTemplate, placeholder_key};
    use pretty_assertions::assert_eq;
    use serde_json::{Map, Value, json};

    fn data(value: Value) -> Map<String, Value> {
        value.as_object().cloned().expect("object")
    }

    #[test]
    fn resolves_nested_template() {
        let template = MetaFilterTemplate::from_value(json!({ "a": "{x}", "b": { "c": "{y}" } }));
        let resolved = template.resolve(&data(json!({ "x": 5, "y": "hi" })));
        assert_eq!(resolved, json!({ "a": 5, "b": { "c": null } }));
    }

    #[test]
    fn string_data_is_parsed_as_json() {
        let template = MetaFilterTemplate::from_value(json!({
            "n": "{n}",
            "flag": "{flag}",
            "list": "{list}",
            "quoted": "{quoted}",
        }));
        let resolved = template.resolve(&data(json!({
            "n": "42",
            "flag": "true",
            "list": "[1, 2]",
            "quoted": "\"2024-05-01\"",
        })));
        assert_eq!(
            resolved,
            json!({ "n": 42, "flag": true, "list": [1, 2], "quoted": "2024-05-01" })
        );
    }

    #[test]
    fn absent_keys_resolve_to_null() {
        let template =
            MetaFilterTemplate::from_value(json!({ "missing": "{nope}", "null": "{z}" }));
        let resolved = template.resolve(&data(json!({ "z": null })));
        assert_eq!(resolved, json!({ "missing": null, "null": null }));
    }

    #[test]
    fn arrays_and_literals_are_kept_in_shape() {
        let template = MetaFilterTemplate::from_value(json!({
            "$in": ["{a}", "{b}"],
            "limit": 3,
            "strict": false,
        }));
        let resolved = template.resolve(&data(json!({ "a": 1, "b": [2, 3] })));
        assert_eq!(
            resolved,
            json!({ "$in": [1, [2, 3]], "limit": 3, "strict": false })
        );
    }

    #[test]
    fn placeholder_key_strips_one_brace_each_side() {
        assert_eq!(placeholder_key("{name}"), "name");
        assert_eq!(placeholder_key("name"), "name");
        assert_eq!(placeholder_key("{{name}}"), "{name}");
        assert_eq!(placeholder_key("{name"), "name");
    }

    #[test]
    fn preserves_template_key_order() {
        let template = MetaFilterTemplate::from_value(json!({ "z": "{a}", "a": "{a}" }));
        let resolved = template.resolve(&data(json!({ "a": 1 })));
        let keys = resolved
            .as_object()
            .map(|map| map.keys().cloned().collect::<Vec<_>>())
            .unwrap_or_default();
        assert_eq!(keys, vec!["z", "a"]);
    }
}
