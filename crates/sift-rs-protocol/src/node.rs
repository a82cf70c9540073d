//! Node descriptors presented to the host for discovery and parameter rendering.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of value an input parameter accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParamKind {
    String,
    Number,
    Json,
    /// Handle supplied by another node, named by its base class.
    Handle(String),
}

/// One input parameter of a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputParam {
    pub label: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ParamKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<u32>,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub additional_params: bool,
    #[serde(default)]
    pub accept_variable: bool,
    #[serde(default)]
    pub list: bool,
}

impl InputParam {
    /// Create a required parameter with no extra presentation hints.
    pub fn new(label: impl Into<String>, name: impl Into<String>, kind: ParamKind) -> Self {
        Self {
            label: label.into(),
            name: name.into(),
            kind,
            description: None,
            default: None,
            placeholder: None,
            rows: None,
            optional: false,
            additional_params: false,
            accept_variable: false,
            list: false,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn default_value(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn rows(mut self, rows: u32) -> Self {
        self.rows = Some(rows);
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Render under the "additional parameters" section.
    pub fn additional(mut self) -> Self {
        self.additional_params = true;
        self
    }

    /// Accept flow variables and list values.
    pub fn variable_list(mut self) -> Self {
        self.accept_variable = true;
        self.list = true;
        self
    }
}

/// One output port of a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputSpec {
    pub label: String,
    pub name: String,
    pub description: String,
    pub base_classes: Vec<String>,
}

/// Node metadata spec for registration and discovery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSpec {
    pub label: String,
    pub name: String,
    pub version: f32,
    #[serde(rename = "type")]
    pub node_type: String,
    pub category: String,
    pub description: String,
    pub base_classes: Vec<String>,
    pub inputs: Vec<InputParam>,
    pub outputs: Vec<OutputSpec>,
}

impl NodeSpec {
    /// Look up an input parameter by name.
    pub fn input(&self, name: &str) -> Option<&InputParam> {
        self.inputs.iter().find(|input| input.name == name)
    }

    /// Look up an output port by name.
    pub fn output(&self, name: &str) -> Option<&OutputSpec> {
        self.outputs.iter().find(|output| output.name == name)
    }
}
