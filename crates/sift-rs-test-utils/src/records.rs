use serde_json::{Value, json};
use sift_rs_protocol::Record;

/// Document record with `pageContent` and a `metadata.source` value.
pub fn document(page_content: &str, source: &str) -> Record {
    Record::document(page_content, json!({ "source": source }))
}

/// Records from `(pageContent, source)` pairs, in order.
pub fn documents_from(pairs: &[(&str, &str)]) -> Vec<Record> {
    pairs
        .iter()
        .map(|(page_content, source)| document(page_content, source))
        .collect()
}

/// JSON array text for `records`, as a host would pass it.
pub fn records_json(records: &[Record]) -> String {
    Value::Array(records.iter().map(|record| record.as_value().clone()).collect()).to_string()
}
