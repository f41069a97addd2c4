//! Atlassian Document Format builders
//!
//! Jira Cloud v3 takes rich text as an ADF document. Only plain paragraphs
//! are produced here.

use serde_json::{json, Value};

/// A `doc` node holding one paragraph per entry
pub fn paragraphs<S: AsRef<str>>(texts: &[S]) -> Value {
    let content: Vec<Value> = texts.iter().map(|t| paragraph(t.as_ref())).collect();
    json!({
        "type": "doc",
        "version": 1,
        "content": content,
    })
}

/// A `doc` node with a single paragraph
pub fn document(text: &str) -> Value {
    paragraphs(&[text])
}

fn paragraph(text: &str) -> Value {
    json!({
        "type": "paragraph",
        "content": [{"type": "text", "text": text}],
    })
}
