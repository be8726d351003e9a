//! Construction of the translated copy of a document.

use super::{Document, DocumentKind, FieldPath, TranslationPatch};
use crate::error::Result;
use serde_json::Value;

/// Top-level keys tying a document to its source collection.
pub const IDENTITY_KEYS: [&str; 3] = ["_id", "pack", "folder"];

const PAGES_KEY: &str = "pages";

/// Build the translated copy of `original`.
///
/// The copy has no identity keys, is named `name_prefix` + original name and
/// carries the patched text. Journal pages are rebuilt one by one and the
/// page array replaced as a whole.
pub fn rebuild(original: &Document, patch: &TranslationPatch, name_prefix: &str) -> Result<Document> {
    let mut data = original.data().clone();
    let pages_root = FieldPath::default().key(PAGES_KEY);

    let rebuilt_pages = match (original.kind(), original.data().get(PAGES_KEY)) {
        (DocumentKind::JournalEntry, Some(Value::Array(pages))) => {
            Some(rebuild_pages(pages, patch, &pages_root)?)
        }
        _ => None,
    };
    let pages_replaced = rebuilt_pages.is_some();

    if let Some(fields) = data.as_object_mut() {
        for key in IDENTITY_KEYS {
            fields.remove(key);
        }
        fields.insert(
            "name".to_string(),
            Value::String(format!("{}{}", name_prefix, original.name())),
        );
        if let Some(pages) = rebuilt_pages {
            fields.insert(PAGES_KEY.to_string(), Value::Array(pages));
        }
    }

    for (path, text) in patch.iter() {
        if pages_replaced && path.strip_prefix(&pages_root).is_some() {
            continue;
        }
        path.assign(&mut data, Value::String(text.to_string()))?;
    }

    Document::new(original.kind().clone(), data)
}

fn rebuild_pages(
    pages: &[Value],
    patch: &TranslationPatch,
    pages_root: &FieldPath,
) -> Result<Vec<Value>> {
    pages
        .iter()
        .enumerate()
        .map(|(i, page)| {
            let page_root = pages_root.clone().index(i);
            let mut page = page.clone();
            if let Some(fields) = page.as_object_mut() {
                fields.remove("_id");
            }
            for (path, text) in patch.iter() {
                if let Some(relative) = path.strip_prefix(&page_root) {
                    relative.assign(&mut page, Value::String(text.to_string()))?;
                }
            }
            Ok(page)
        })
        .collect()
}
