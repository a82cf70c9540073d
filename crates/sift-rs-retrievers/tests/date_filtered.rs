//! Date-filtered retriever runs against scripted language models.

use pretty_assertions::assert_eq;
use serde_json::json;
use sift_rs_config::NodeData;
use sift_rs_protocol::{NodeOutput, Record};
use sift_rs_retrievers::{DateFilteredRetriever, NodeHandles, RetrieverError, RetrieverNode};
use sift_rs_test_utils::{FailingLLM, RecordingLLM, ScriptedLLM, documents_from, records_json};
use std::sync::Arc;

fn sample_records() -> Vec<Record> {
    documents_from(&[
        ("q1 report", "2023.pdf"),
        ("q2 report", "2024.pdf"),
        ("q3 report", "2023.pdf"),
        ("q4 report", "2024.pdf"),
        ("appendix", "2024.pdf"),
    ])
}

fn node_data(records: &[Record]) -> NodeData {
    NodeData::new()
        .with_input("modelPrompt", "Files: {files}. Pick those closest to {date}.")
        .with_input("promptValues", json!({ "date": "2024-06-01" }))
        .with_input("metaPrompt", "metadata.source")
        .with_input("dataValues", json!([records_json(records)]))
        .with_output("document")
}

fn bodies(output: &NodeOutput) -> Vec<String> {
    output
        .documents()
        .unwrap_or_default()
        .iter()
        .map(Record::page_content_text)
        .collect()
}

/// The prompt lists each distinct field value once, in first-seen order.
#[tokio::test]
async fn prompt_lists_distinct_values() {
    let records = sample_records();
    let (model, prompts) = RecordingLLM::new(r#"["2024.pdf"]"#);
    let handles = NodeHandles::new().with_model(Arc::new(model));

    DateFilteredRetriever::new()
        .run(&node_data(&records), &handles)
        .await
        .expect("run");

    assert_eq!(
        prompts.lock().clone(),
        vec![r#"Files: "2023.pdf","2024.pdf". Pick those closest to 2024-06-01."#.to_string()]
    );
}

/// Records matching the named values are returned, capped per value.
#[tokio::test]
async fn named_values_are_capped_per_value() {
    let records = sample_records();
    let data = node_data(&records).with_input("topKCurrent", "2");
    let model = ScriptedLLM::new(r#"The current files are ["2024.pdf", "2023.pdf"]."#);
    let handles = NodeHandles::new().with_model(Arc::new(model));

    let output = DateFilteredRetriever::new()
        .run(&data, &handles)
        .await
        .expect("run");

    assert_eq!(
        bodies(&output),
        vec!["q2 report", "q4 report", "q1 report", "q3 report"]
    );
}

/// An unparsable answer falls back to the first `topK` records.
#[tokio::test]
async fn unparsable_answer_falls_back_to_top_k() {
    let records = sample_records();
    let data = node_data(&records).with_input("topK", 3);
    let handles = NodeHandles::new().with_model(Arc::new(ScriptedLLM::new("I am not sure.")));

    let output = DateFilteredRetriever::new()
        .run(&data, &handles)
        .await
        .expect("run");

    assert_eq!(bodies(&output), vec!["q1 report", "q2 report", "q3 report"]);
}

/// An empty answer also falls back to the head of the input.
#[tokio::test]
async fn empty_answer_falls_back() {
    let records = sample_records();
    let data = node_data(&records).with_input("topK", "1");
    let handles = NodeHandles::new().with_model(Arc::new(ScriptedLLM::silent()));

    let output = DateFilteredRetriever::new()
        .run(&data, &handles)
        .await
        .expect("run");

    assert_eq!(bodies(&output), vec!["q1 report"]);
}

/// Text spanning several bracketed lists does not parse, so the run falls back.
#[tokio::test]
async fn bracketed_noise_falls_back() {
    let records = sample_records();
    let data = node_data(&records).with_input("topK", 2);
    let handles = NodeHandles::new().with_model(Arc::new(ScriptedLLM::new("[1] or [2]")));

    let output = DateFilteredRetriever::new()
        .run(&data, &handles)
        .await
        .expect("run");

    assert_eq!(bodies(&output), vec!["q1 report", "q2 report"]);
}

/// An answer listing no usable strings selects nothing rather than falling back.
#[tokio::test]
async fn answer_without_string_values_selects_nothing() {
    let records = sample_records();
    for response in ["[1, 2]", "[\"\"]", "[null]"] {
        let handles = NodeHandles::new().with_model(Arc::new(ScriptedLLM::new(response)));

        let output = DateFilteredRetriever::new()
            .run(&node_data(&records), &handles)
            .await
            .expect("run");

        assert_eq!(output, NodeOutput::Documents(Vec::new()), "{response:?}");
    }
}

/// A missing or malformed field path still reaches the model and falls back.
#[tokio::test]
async fn unusable_field_path_still_returns_head() {
    let records = sample_records();
    for meta_prompt in ["", "metadata..source", "metadata[source]"] {
        let (model, prompts) = RecordingLLM::new("[]");
        let handles = NodeHandles::new().with_model(Arc::new(model));
        let data = node_data(&records)
            .with_input("metaPrompt", meta_prompt)
            .with_input("topK", 2);

        let output = DateFilteredRetriever::new()
            .run(&data, &handles)
            .await
            .expect("run");

        assert_eq!(bodies(&output), vec!["q1 report", "q2 report"], "{meta_prompt:?}");
        assert_eq!(
            prompts.lock().clone(),
            vec!["Files: . Pick those closest to 2024-06-01.".to_string()]
        );
    }
}

/// The text port renders the selected records as escaped text.
#[tokio::test]
async fn text_output_renders_selection() {
    let records = sample_records();
    let data = node_data(&records)
        .with_input("topKCurrent", 1)
        .with_output("text");
    let handles = NodeHandles::new().with_model(Arc::new(ScriptedLLM::new(r#"["2023.pdf"]"#)));

    let output = DateFilteredRetriever::new()
        .run(&data, &handles)
        .await
        .expect("run");

    assert_eq!(output, NodeOutput::Text("q1 report\\n".to_string()));
}

/// Malformed JSON inputs fail before the model is invoked.
#[tokio::test]
async fn malformed_json_issues_no_inference() {
    for input in ["promptValues", "dataValues"] {
        let (model, prompts) = RecordingLLM::new("[]");
        let handles = NodeHandles::new().with_model(Arc::new(model));
        let data = node_data(&sample_records()).with_input(input, "[oops");

        let err = DateFilteredRetriever::new()
            .run(&data, &handles)
            .await
            .unwrap_err();

        assert!(
            matches!(err, RetrieverError::InvalidJson { input: name, .. } if name == input),
            "unexpected error for {input}: {err}"
        );
        assert!(prompts.lock().is_empty());
    }
}

/// A flat record list is accepted as well as the double-nested form.
#[tokio::test]
async fn flat_record_list_is_accepted() {
    let records = sample_records();
    let data = node_data(&records).with_input(
        "dataValues",
        serde_json::Value::Array(records.iter().map(|record| record.as_value().clone()).collect()),
    );
    let handles = NodeHandles::new().with_model(Arc::new(ScriptedLLM::new(r#"["2023.pdf"]"#)));

    let output = DateFilteredRetriever::new()
        .run(&data, &handles)
        .await
        .expect("run");

    assert_eq!(bodies(&output), vec!["q1 report", "q3 report"]);
}

/// A run without a model is rejected before inputs are read.
#[tokio::test]
async fn missing_model_is_reported() {
    let data = NodeData::new().with_input("promptValues", "[oops");
    let err = DateFilteredRetriever::new()
        .run(&data, &NodeHandles::new())
        .await
        .unwrap_err();
    assert!(matches!(err, RetrieverError::MissingInput { input: "model", .. }));
}

/// Model failures propagate to the caller.
#[tokio::test]
async fn model_failure_propagates() {
    let handles = NodeHandles::new().with_model(Arc::new(FailingLLM::new("quota")));
    let err = DateFilteredRetriever::new()
        .run(&node_data(&sample_records()), &handles)
        .await
        .unwrap_err();
    assert!(matches!(err, RetrieverError::Llm(message) if message.contains("quota")));
}
