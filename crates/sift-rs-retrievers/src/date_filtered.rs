//! Date-filtered retriever.
//!
//! Distinct values of one field are collected from the supplied records and
//! offered to a language model, which answers with the values it considers
//! current (for example the files closest to a date). Records carrying those
//! values are returned; when the model names none, the head of the input is
//! returned instead.

use crate::error::RetrieverError;
use crate::field_path::FieldPath;
use crate::llm::invoke_model;
use crate::node::{NodeHandles, RetrieverNode, retriever_outputs};
use crate::output::shape_output;
use crate::template::{DEFAULT_PROMPT, PromptTemplate};
use async_trait::async_trait;
use autoagents_llm::LLMProvider;
use log::{debug, info, warn};
use serde_json::{Map, Value};
use sift_rs_config::NodeData;
use sift_rs_protocol::{InputParam, NodeOutput, NodeSpec, ParamKind, Record};
use std::collections::HashSet;

/// Registered node name.
pub const DATE_FILTERED_RETRIEVER: &str = "dateFilteredRetriever";
/// Placeholder that receives the extracted field values.
pub const FILES_PLACEHOLDER: &str = "files";
/// Records returned when the model names no current values.
pub const DEFAULT_TOP_K: usize = 20;
/// Records returned per current value.
pub const DEFAULT_TOP_K_CURRENT: usize = 20;

/// Resolved inputs for one date-filtered run.
#[derive(Debug, Clone, PartialEq)]
pub struct DateFilteredQuery {
    /// Prompt template; `{files}` receives the extracted values.
    pub prompt: String,
    /// Flat substitutions applied after `{files}`.
    pub prompt_values: Map<String, Value>,
    /// Field compared against the model's answer; `None` when the path is
    /// missing or unusable, so no record carries a value.
    pub field_path: Option<FieldPath>,
    /// Candidate records in input order.
    pub records: Vec<Record>,
    /// Fallback count when the model names nothing.
    pub top_k: usize,
    /// Cap per named value.
    pub top_k_current: usize,
}

impl DateFilteredQuery {
    pub fn new(field_path: FieldPath, records: Vec<Record>) -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            prompt_values: Map::new(),
            field_path: Some(field_path),
            records,
            top_k: DEFAULT_TOP_K,
            top_k_current: DEFAULT_TOP_K_CURRENT,
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn with_prompt_values(mut self, values: Map<String, Value>) -> Self {
        self.prompt_values = values;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_top_k_current(mut self, top_k_current: usize) -> Self {
        self.top_k_current = top_k_current;
        self
    }

    /// Read the query from node inputs.
    pub fn from_node_data(data: &NodeData) -> Result<Self, RetrieverError> {
        let prompt = data
            .string("modelPrompt")?
            .unwrap_or_else(|| DEFAULT_PROMPT.to_string());
        let prompt_values = data
            .json_object("promptValues")
            .map_err(|err| {
                RetrieverError::invalid_json(DATE_FILTERED_RETRIEVER, "promptValues", err)
            })?
            .unwrap_or_default();
        let data_values = data
            .json_value("dataValues")
            .map_err(|err| {
                RetrieverError::invalid_json(DATE_FILTERED_RETRIEVER, "dataValues", err)
            })?;
        let records = expect_record_array(unwrap_data_values(data_values)?)?;
        let field_path = read_field_path(data);
        Ok(Self {
            prompt,
            prompt_values,
            field_path,
            records,
            top_k: data.usize_or("topK", DEFAULT_TOP_K)?,
            top_k_current: data.usize_or("topKCurrent", DEFAULT_TOP_K_CURRENT)?,
        })
    }

    /// Distinct non-empty string values of the field, in first-seen order.
    /// Records whose path cannot be evaluated are skipped.
    pub fn field_values(&self) -> Vec<String> {
        let Some(path) = &self.field_path else {
            return Vec::new();
        };
        let mut seen = HashSet::new();
        let mut values = Vec::new();
        for (index, record) in self.records.iter().enumerate() {
            match path.lookup_str(record.as_value()) {
                Ok(Some(value)) => {
                    if seen.insert(value) {
                        values.push(value.to_string());
                    }
                }
                Ok(None) => {}
                Err(err) => {
                    warn!("skipping record field (index={index}, path={path}, error={err})")
                }
            }
        }
        values
    }

    /// Prompt with `{files}` replaced by the quoted, comma-separated values,
    /// then the remaining substitutions applied.
    pub fn resolved_prompt(&self, values: &[String]) -> String {
        let mut template = PromptTemplate::new(self.prompt.clone());
        template.substitute(FILES_PLACEHOLDER, &Value::String(files_text(values)));
        for (key, value) in &self.prompt_values {
            if key != FILES_PLACEHOLDER {
                template.substitute(key, value);
            }
        }
        template.into_string()
    }

    /// Select records for the values named by the model.
    ///
    /// Each value contributes up to `top_k_current` matching records in input
    /// order. Without an answer (`None`) the first `top_k` records are returned.
    pub fn select(&self, current: Option<&[String]>) -> Vec<Record> {
        let Some(current) = current else {
            return self.records.iter().take(self.top_k).cloned().collect();
        };
        let mut selected = Vec::new();
        for value in current {
            let matches = self
                .records
                .iter()
                .filter(|record| self.field_matches(record, value))
                .take(self.top_k_current)
                .cloned();
            selected.extend(matches);
        }
        selected
    }

    fn field_matches(&self, record: &Record, expected: &str) -> bool {
        let Some(path) = &self.field_path else {
            return false;
        };
        match path.lookup(record.as_value()) {
            Ok(Some(value)) => loosely_equals(value, expected),
            Ok(None) => false,
            Err(err) => {
                warn!("cannot compare record field (path={path}, error={err})");
                false
            }
        }
    }
}

/// Retriever that asks a language model which records are current.
#[derive(Debug, Default, Clone)]
pub struct DateFilteredRetriever;

impl DateFilteredRetriever {
    pub fn new() -> Self {
        Self
    }

    /// Run the extraction, model call and selection for `query`.
    pub async fn retrieve(
        &self,
        model: &dyn LLMProvider,
        query: &DateFilteredQuery,
    ) -> Result<Vec<Record>, RetrieverError> {
        let values = query.field_values();
        debug!(
            "date filter candidates (records={}, distinct_values={})",
            query.records.len(),
            values.len()
        );
        let prompt = query.resolved_prompt(&values);
        let response = invoke_model(model, &prompt).await?;
        let current = parse_current_values(&response)?;
        let selected = query.select(current.as_deref());
        match &current {
            None => info!(
                "date filter fell back to head of input (returned={})",
                selected.len()
            ),
            Some(values) => info!(
                "date filter kept current records (values={}, returned={})",
                values.len(),
                selected.len()
            ),
        }
        Ok(selected)
    }
}

#[async_trait]
impl RetrieverNode for DateFilteredRetriever {
    fn name(&self) -> &str {
        DATE_FILTERED_RETRIEVER
    }

    fn spec(&self) -> NodeSpec {
        NodeSpec {
            label: "Date Filtered Retriever".to_string(),
            name: DATE_FILTERED_RETRIEVER.to_string(),
            version: 1.3,
            node_type: "DateFilteredRetriever".to_string(),
            category: "Retrievers".to_string(),
            description: "Keep the records a language model picks as nearest to a date"
                .to_string(),
            base_classes: vec![
                "DateFilteredRetriever".to_string(),
                "BaseRetriever".to_string(),
            ],
            inputs: vec![
                InputParam::new(
                    "Language Model",
                    "model",
                    ParamKind::Handle("BaseLanguageModel".to_string()),
                ),
                InputParam::new("Prompt", "modelPrompt", ParamKind::String)
                    .description("Prompt; use {files} for the extracted field values")
                    .rows(4)
                    .default_value(Value::String(DEFAULT_PROMPT.to_string())),
                InputParam::new("Format Prompt Values", "promptValues", ParamKind::Json)
                    .variable_list(),
                InputParam::new("Meta Prompt", "metaPrompt", ParamKind::String)
                    .description("Field path compared with the model answer, e.g. metadata.source")
                    .rows(4),
                InputParam::new("Data Values", "dataValues", ParamKind::Json).variable_list(),
                InputParam::new("Top K to Current Data", "topKCurrent", ParamKind::Number)
                    .description("Number of top results to fetch. Default to 20")
                    .placeholder("20")
                    .optional()
                    .additional(),
                InputParam::new("Top K", "topK", ParamKind::Number)
                    .description("Number of top results to fetch. Default to 20")
                    .placeholder("20")
                    .optional()
                    .additional(),
            ],
            outputs: retriever_outputs(),
        }
    }

    async fn run(
        &self,
        data: &NodeData,
        handles: &NodeHandles,
    ) -> Result<NodeOutput, RetrieverError> {
        let model = handles
            .model
            .as_deref()
            .ok_or(RetrieverError::MissingInput {
                node: DATE_FILTERED_RETRIEVER,
                input: "model",
            })?;
        let query = DateFilteredQuery::from_node_data(data)?;
        let records = self.retrieve(model, &query).await?;
        Ok(shape_output(records, data.output_port()))
    }
}

/// Unwrap the record list once when it arrives double-nested: a first
/// element that is an array (or JSON text of one) replaces the outer list.
/// A flat list of records is returned as is.
pub fn unwrap_data_values(value: Option<Value>) -> Result<Value, RetrieverError> {
    let Some(value) = value else {
        return Ok(Value::Array(Vec::new()));
    };
    let mut items = match value {
        Value::Array(items) => items,
        other => return Ok(other),
    };
    if matches!(items.first(), Some(Value::Array(_))) {
        return Ok(items.swap_remove(0));
    }
    if let Some(Value::String(text)) = items.first() {
        return serde_json::from_str(text).map_err(|err| RetrieverError::InvalidJson {
            node: DATE_FILTERED_RETRIEVER,
            input: "dataValues",
            message: err.to_string(),
        });
    }
    Ok(Value::Array(items))
}

/// Require the unwrapped data values to be an array of records.
pub fn expect_record_array(value: Value) -> Result<Vec<Record>, RetrieverError> {
    match value {
        Value::Array(items) => Ok(items.into_iter().map(Record::new).collect()),
        other => Err(RetrieverError::InvalidData {
            node: DATE_FILTERED_RETRIEVER,
            message: format!("dataValues must be an array, got {}", json_kind(&other)),
        }),
    }
}

/// Extract the values the model named as current.
///
/// The text between the first `[` and the last `]` is parsed as a JSON array.
/// Unparsable text or an empty array is no answer (`None`). A non-empty array
/// is an answer even when none of its entries are usable: only its non-empty
/// strings are kept. A parsed value that is not an array is an error.
pub fn parse_current_values(response: &str) -> Result<Option<Vec<String>>, RetrieverError> {
    let tail = &response[response.find('[').unwrap_or(0)..];
    let candidate = match tail.rfind(']') {
        Some(end) => &tail[..=end],
        None => "",
    };
    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Array(items)) if items.is_empty() => Ok(None),
        Ok(Value::Array(items)) => Ok(Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(text) if !text.is_empty() => Some(text),
                    _ => None,
                })
                .collect(),
        )),
        Ok(other) => Err(RetrieverError::InvalidData {
            node: DATE_FILTERED_RETRIEVER,
            message: format!("model filter must be an array, got {}", json_kind(&other)),
        }),
        Err(err) => {
            warn!("model response has no usable filter list (error={err})");
            Ok(None)
        }
    }
}

/// Field path named by `metaPrompt`. A missing or malformed path is logged
/// and leaves every record without a value.
fn read_field_path(data: &NodeData) -> Option<FieldPath> {
    let expression = match data.string("metaPrompt") {
        Ok(Some(expression)) if !expression.trim().is_empty() => expression,
        Ok(_) => {
            warn!("date filter has no field path, no values extracted (input=metaPrompt)");
            return None;
        }
        Err(err) => {
            warn!("date filter field path unreadable (input=metaPrompt, error={err})");
            return None;
        }
    };
    match FieldPath::parse(&expression) {
        Ok(path) => Some(path),
        Err(err) => {
            warn!("date filter field path unusable, no values extracted (error={err})");
            None
        }
    }
}

/// Quoted, comma-separated values: the JSON array text without its brackets.
fn files_text(values: &[String]) -> String {
    let list = Value::Array(values.iter().cloned().map(Value::String).collect()).to_string();
    list.replacen('[', "", 1).replacen(']', "", 1)
}

/// Compare a field value with a value named by the model.
///
/// Strings compare verbatim. Numbers and booleans (as 1 or 0) compare
/// numerically with the named value read as a number, blank text reading as
/// 0. Arrays, objects and null never match.
fn loosely_equals(value: &Value, expected: &str) -> bool {
    match value {
        Value::String(text) => text == expected,
        Value::Number(number) => number
            .as_f64()
            .is_some_and(|left| numeric_text(expected) == Some(left)),
        Value::Bool(flag) => numeric_text(expected) == Some(if *flag { 1.0 } else { 0.0 }),
        _ => false,
    }
}

fn numeric_text(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    trimmed.parse().ok()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::{
        DateFilteredQuery, expect_record_array, files_text, loosely_equals,
        parse_current_values, unwrap_data_values,
    };
    use crate::error::RetrieverError;
    use crate::field_path::FieldPath;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use sift_rs_config::NodeData;
    use sift_rs_protocol::Record;

    fn record(source: &str, body: &str) -> Record {
        Record::document(body, json!({ "source": source }))
    }

    fn query(records: Vec<Record>) -> DateFilteredQuery {
        DateFilteredQuery::new(FieldPath::parse("metadata.source").expect("path"), records)
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn field_values_dedupe_in_first_seen_order() {
        let query = query(vec![
            record("b.pdf", "1"),
            record("a.pdf", "2"),
            record("b.pdf", "3"),
            Record::new(json!({ "metadata": { "source": "" } })),
            Record::new(json!({ "metadata": { "source": 7 } })),
            Record::new(json!({ "other": true })),
            record("A.pdf", "4"),
        ]);
        assert_eq!(query.field_values(), vec!["b.pdf", "a.pdf", "A.pdf"]);
    }

    #[test]
    fn resolved_prompt_fills_files_then_other_values() {
        let values = json!({ "files": "ignored", "date": "2024-06-01" });
        let query = query(Vec::new())
            .with_prompt("Closest to {date}: {files}")
            .with_prompt_values(values.as_object().cloned().expect("object"));
        let prompt = query.resolved_prompt(&strings(&["a.pdf", "b.pdf"]));
        assert_eq!(prompt, r#"Closest to 2024-06-01: "a.pdf","b.pdf""#);
    }

    #[test]
    fn files_text_drops_first_open_and_close_bracket() {
        assert_eq!(files_text(&[]), "");
        assert_eq!(files_text(&strings(&["x"])), r#""x""#);
        // The first ']' may sit inside a value; the closing one then stays.
        assert_eq!(files_text(&strings(&["a]b", "c"])), r#""ab","c"]"#);
    }

    #[test]
    fn parse_current_values_extracts_bracketed_list() {
        let response = r#"Sure! The files are ["a.pdf", "", 3, "b.pdf"] as requested."#;
        let parsed = parse_current_values(response).expect("parsed");
        assert_eq!(parsed, Some(strings(&["a.pdf", "b.pdf"])));
    }

    #[test]
    fn parse_current_values_treats_garbage_and_empty_as_no_answer() {
        for response in ["no list here", "[not, json]", "", "[]", "[1] or [2]"] {
            assert_eq!(parse_current_values(response).expect("parsed"), None, "{response:?}");
        }
    }

    #[test]
    fn parse_current_values_keeps_answer_without_usable_strings() {
        for response in ["[1, 2]", "[\"\"]", "[null]"] {
            assert_eq!(
                parse_current_values(response).expect("parsed"),
                Some(Vec::new()),
                "{response:?}"
            );
        }
    }

    #[test]
    fn select_caps_each_value_separately() {
        let query = query(vec![
            record("a", "a1"),
            record("b", "b1"),
            record("a", "a2"),
            record("b", "b2"),
            record("a", "a3"),
        ])
        .with_top_k_current(2);
        let selected = query.select(Some(strings(&["b", "a"]).as_slice()));
        let bodies = selected
            .iter()
            .map(Record::page_content_text)
            .collect::<Vec<_>>();
        assert_eq!(bodies, vec!["b1", "b2", "a1", "a2"]);
    }

    #[test]
    fn select_without_answer_takes_head() {
        let query = query(vec![record("a", "1"), record("b", "2"), record("c", "3")]).with_top_k(2);
        assert_eq!(query.select(None), vec![record("a", "1"), record("b", "2")]);
    }

    #[test]
    fn select_with_empty_answer_returns_nothing() {
        let query = query(vec![record("a", "1"), record("b", "2")]);
        assert_eq!(query.select(Some(&[][..])), Vec::<Record>::new());
        assert_eq!(query.select(Some(strings(&["zzz"]).as_slice())), Vec::<Record>::new());
    }

    #[test]
    fn unwrap_data_values_handles_nesting() {
        let nested = json!([[{ "id": 1 }, { "id": 2 }]]);
        assert_eq!(
            unwrap_data_values(Some(nested)).expect("nested"),
            json!([{ "id": 1 }, { "id": 2 }])
        );

        let text = json!(["[{\"id\": 3}]"]);
        assert_eq!(unwrap_data_values(Some(text)).expect("text"), json!([{ "id": 3 }]));

        let flat = json!([{ "id": 4 }, { "id": 5 }]);
        assert_eq!(unwrap_data_values(Some(flat.clone())).expect("flat"), flat);

        assert_eq!(unwrap_data_values(None).expect("absent"), json!([]));
        assert_eq!(unwrap_data_values(Some(json!([]))).expect("empty"), json!([]));
    }

    #[test]
    fn unwrap_data_values_rejects_bad_inner_text() {
        let err = unwrap_data_values(Some(json!(["not json"]))).unwrap_err();
        assert!(matches!(err, RetrieverError::InvalidJson { input: "dataValues", .. }));
    }

    #[test]
    fn record_array_is_required() {
        let err = expect_record_array(json!({ "id": 1 })).unwrap_err();
        assert!(matches!(err, RetrieverError::InvalidData { .. }));
        let inner = unwrap_data_values(Some(json!(["{\"id\": 1}"]))).expect("inner");
        let err = expect_record_array(inner).unwrap_err();
        assert!(matches!(err, RetrieverError::InvalidData { .. }));
    }

    #[test]
    fn loose_equality_coerces_numbers_and_booleans() {
        assert!(loosely_equals(&json!("2024"), "2024"));
        assert!(!loosely_equals(&json!("2024"), "2024.0"));
        assert!(loosely_equals(&json!(2024), "2024"));
        assert!(loosely_equals(&json!(2024), " 2024.0 "));
        assert!(loosely_equals(&json!(0), ""));
        assert!(loosely_equals(&json!(true), "1"));
        assert!(loosely_equals(&json!(false), "0"));
        assert!(!loosely_equals(&json!(true), "true"));
        assert!(!loosely_equals(&json!(["a"]), "a"));
        assert!(!loosely_equals(&Value::Null, "null"));
    }

    #[test]
    fn from_node_data_reads_inputs() {
        let data = NodeData::new()
            .with_input("modelPrompt", "Pick from {files}")
            .with_input("metaPrompt", "metadata.source")
            .with_input("dataValues", r#"[[{"pageContent": "x", "metadata": {"source": "a"}}]]"#)
            .with_input("topK", 3)
            .with_input("topKCurrent", "1");
        let query = DateFilteredQuery::from_node_data(&data).expect("query");
        assert_eq!(query.records.len(), 1);
        assert_eq!(query.top_k, 3);
        assert_eq!(query.top_k_current, 1);
        assert_eq!(
            query.field_path.as_ref().map(FieldPath::as_str),
            Some("metadata.source")
        );
    }

    #[test]
    fn unusable_field_path_leaves_records_without_values() {
        let records = r#"[{"pageContent": "x", "metadata": {"source": "a"}}]"#;
        for meta_prompt in [None, Some(""), Some("metadata..source"), Some("a[")] {
            let mut data = NodeData::new().with_input("dataValues", records);
            if let Some(expression) = meta_prompt {
                data = data.with_input("metaPrompt", expression);
            }
            let query = DateFilteredQuery::from_node_data(&data).expect("query");
            assert_eq!(query.field_path, None, "{meta_prompt:?}");
            assert_eq!(query.field_values(), Vec::<String>::new());
            assert_eq!(query.select(Some(strings(&["a"]).as_slice())), Vec::<Record>::new());
        }
    }
}
