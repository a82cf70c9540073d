//! Shaping retrieved records for the selected output port.

use crate::escape::handle_escape_characters;
use sift_rs_protocol::{NodeOutput, OutputPort, Record};

/// Shape `records` for `port`; an unserved port yields [`NodeOutput::Empty`].
pub fn shape_output(records: Vec<Record>, port: Option<OutputPort>) -> NodeOutput {
    match port {
        Some(OutputPort::Document) => NodeOutput::Documents(records),
        Some(OutputPort::Text) => NodeOutput::Text(records_to_text(&records)),
        None => NodeOutput::Empty,
    }
}

/// Each record's page content followed by a newline, escape-normalized.
pub fn records_to_text(records: &[Record]) -> String {
    let mut text = String::new();
    for record in records {
        text.push_str(&record.page_content_text());
        text.push('\n');
    }
    handle_escape_characters(&text, false)
}
