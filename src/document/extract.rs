//! Selection of the text fields that get sent for translation.

use super::{Document, DocumentKind, FieldPath};
use serde_json::Value;

/// A text field that needs translating, with its current content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatableField {
    pub path: FieldPath,
    pub text: String,
}

/// Whether a field value should be sent to the provider.
///
/// Empty, whitespace-only and non-string values are left as they are.
pub fn is_translatable(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::String(s)) if !s.trim().is_empty())
}

/// Collect the translatable fields of a document, in a stable order.
pub fn extract_fields(document: &Document) -> Vec<TranslatableField> {
    let candidates = match document.kind() {
        DocumentKind::Item => vec![
            FieldPath::parse("system.description.value"),
            FieldPath::parse("system.description.chat"),
        ],
        DocumentKind::Actor => vec![FieldPath::parse("system.details.biography.value")],
        DocumentKind::JournalEntry => page_fields(document),
        DocumentKind::Other(_) => Vec::new(),
    };

    candidates
        .into_iter()
        .filter_map(|path| {
            let value = document.get(&path);
            if !is_translatable(value) {
                return None;
            }
            let text = value?.as_str()?.to_string();
            Some(TranslatableField { path, text })
        })
        .collect()
}

/// Body content of text pages plus every image caption.
fn page_fields(document: &Document) -> Vec<FieldPath> {
    let Some(pages) = document.data().get("pages").and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut paths = Vec::new();
    for (i, page) in pages.iter().enumerate() {
        let page_path = FieldPath::default().key("pages").index(i);
        if page.get("type").and_then(Value::as_str) == Some("text") {
            paths.push(page_path.clone().key("text").key("content"));
        }
        paths.push(page_path.key("image").key("caption"));
    }
    paths
}
