//! Templated retriever: a prompt and metadata filter resolved from templates,
//! answered by one similarity search.

use crate::error::RetrieverError;
use crate::meta_filter::MetaFilterTemplate;
use crate::node::{NodeHandles, RetrieverNode, retriever_outputs};
use crate::output::shape_output;
use crate::template::{DEFAULT_PROMPT, PromptTemplate};
use async_trait::async_trait;
use log::{debug, info};
use serde_json::{Map, Value, json};
use sift_rs_config::NodeData;
use sift_rs_protocol::{InputParam, NodeOutput, NodeSpec, ParamKind, Record, VectorStore};

/// Registered node name.
pub const TEMPLATED_RETRIEVER: &str = "templatedRetriever";
/// Result count used when `topK` is not set.
pub const DEFAULT_TEMPLATED_TOP_K: usize = 4;

/// Resolved inputs for one templated search.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplatedQuery {
    /// Prompt template.
    pub prompt: String,
    /// Flat substitutions for the prompt.
    pub prompt_values: Map<String, Value>,
    /// Flat metadata values; the filter itself when no template is set.
    pub metadata_filter: Map<String, Value>,
    /// Nested metadata-filter template.
    pub meta_template: Option<MetaFilterTemplate>,
    /// Number of records to request.
    pub top_k: usize,
}

impl Default for TemplatedQuery {
    fn default() -> Self {
        Self::new(DEFAULT_PROMPT)
    }
}

impl TemplatedQuery {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            prompt_values: Map::new(),
            metadata_filter: Map::new(),
            meta_template: None,
            top_k: DEFAULT_TEMPLATED_TOP_K,
        }
    }

    pub fn with_prompt_values(mut self, values: Map<String, Value>) -> Self {
        self.prompt_values = values;
        self
    }

    pub fn with_metadata_filter(mut self, filter: Map<String, Value>) -> Self {
        self.metadata_filter = filter;
        self
    }

    pub fn with_meta_template(mut self, template: MetaFilterTemplate) -> Self {
        self.meta_template = Some(template);
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Read the query from node inputs. Malformed JSON fails here, before any
    /// search is issued.
    pub fn from_node_data(data: &NodeData) -> Result<Self, RetrieverError> {
        let prompt = data
            .string("modelPrompt")?
            .unwrap_or_else(|| DEFAULT_PROMPT.to_string());
        let prompt_values = data
            .json_object("promptValues")
            .map_err(|err| RetrieverError::invalid_json(TEMPLATED_RETRIEVER, "promptValues", err))?
            .unwrap_or_default();
        let metadata_filter = data
            .json_object("metadataFilter")
            .map_err(|err| {
                RetrieverError::invalid_json(TEMPLATED_RETRIEVER, "metadataFilter", err)
            })?
            .unwrap_or_default();
        let meta_template = data
            .json5_value("metaPrompt")
            .map_err(|err| RetrieverError::invalid_json(TEMPLATED_RETRIEVER, "metaPrompt", err))?
            .map(MetaFilterTemplate::from_value);
        let top_k = data.usize_or("topK", DEFAULT_TEMPLATED_TOP_K)?;
        Ok(Self {
            prompt,
            prompt_values,
            metadata_filter,
            meta_template,
            top_k,
        })
    }

    /// Prompt with every substitution applied in mapping order.
    pub fn resolved_prompt(&self) -> String {
        PromptTemplate::new(self.prompt.clone()).render(&self.prompt_values)
    }

    /// Metadata filter sent to the store. With a template, leaves resolve
    /// against the prompt values overlaid with the metadata values; without
    /// one, the metadata values are used as they are.
    pub fn resolved_filter(&self) -> Value {
        match &self.meta_template {
            Some(template) => {
                let mut data = self.prompt_values.clone();
                for (key, value) in &self.metadata_filter {
                    data.insert(key.clone(), value.clone());
                }
                template.resolve(&data)
            }
            None => Value::Object(self.metadata_filter.clone()),
        }
    }
}

/// Retriever issuing one similarity search per run.
#[derive(Debug, Default, Clone)]
pub struct TemplatedRetriever;

impl TemplatedRetriever {
    pub fn new() -> Self {
        Self
    }

    /// Resolve the query and run the similarity search.
    pub async fn retrieve(
        &self,
        store: &dyn VectorStore,
        query: &TemplatedQuery,
    ) -> Result<Vec<Record>, RetrieverError> {
        let prompt = query.resolved_prompt();
        let filter = json!({ "metadata": query.resolved_filter() });
        debug!(
            "templated search (store={}, top_k={}, filter={})",
            store.name(),
            query.top_k,
            filter
        );
        let records = store.similarity_search(&prompt, query.top_k, &filter).await?;
        info!(
            "templated search complete (store={}, returned={})",
            store.name(),
            records.len()
        );
        Ok(records)
    }
}

#[async_trait]
impl RetrieverNode for TemplatedRetriever {
    fn name(&self) -> &str {
        TEMPLATED_RETRIEVER
    }

    fn spec(&self) -> NodeSpec {
        NodeSpec {
            label: "Templated Retriever".to_string(),
            name: TEMPLATED_RETRIEVER.to_string(),
            version: 1.2,
            node_type: "TemplatedRetriever".to_string(),
            category: "Retrievers".to_string(),
            description: "Search a vector store with a templated prompt and metadata filter"
                .to_string(),
            base_classes: vec!["TemplatedRetriever".to_string(), "BaseRetriever".to_string()],
            inputs: vec![
                InputParam::new(
                    "Vector Store",
                    "vectorStore",
                    ParamKind::Handle("VectorStore".to_string()),
                ),
                InputParam::new("Prompt", "modelPrompt", ParamKind::String)
                    .description("Use {question} to refer to the original question")
                    .rows(4)
                    .default_value(Value::String(DEFAULT_PROMPT.to_string())),
                InputParam::new("Meta Prompt", "metaPrompt", ParamKind::String)
                    .description("Metadata filter template whose values reference {keys}")
                    .rows(4)
                    .optional(),
                InputParam::new("Format Prompt Values", "promptValues", ParamKind::Json)
                    .optional()
                    .variable_list(),
                InputParam::new("Metadata filter", "metadataFilter", ParamKind::Json)
                    .optional()
                    .variable_list(),
                InputParam::new("Top K", "topK", ParamKind::Number)
                    .description("Number of top results to fetch. Default to 4")
                    .placeholder("4")
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
        let query = TemplatedQuery::from_node_data(data)?;
        let Some(port) = data.output_port() else {
            debug!(
                "templated retriever has no output for port (output={:?})",
                data.output()
            );
            return Ok(NodeOutput::Empty);
        };
        let store = handles
            .vector_store
            .as_deref()
            .ok_or(RetrieverError::MissingInput {
                node: TEMPLATED_RETRIEVER,
                input: "vectorStore",
            })?;
        let records = self.retrieve(store, &query).await?;
        Ok(shape_output(records, Some(port)))
    }
}
