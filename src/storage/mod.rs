pub mod json_dir;
pub mod memory;

pub use json_dir::JsonDirStore;
pub use memory::MemoryStore;

use crate::document::{Document, DocumentKind};
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default access level granted per role on a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ownership(pub BTreeMap<String, String>);

impl Default for Ownership {
    fn default() -> Self {
        Self(BTreeMap::from([(
            "PLAYER".to_string(),
            "OBSERVER".to_string(),
        )]))
    }
}

/// A named set of documents of a single kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    pub id: String,
    pub label: String,
    pub kind: DocumentKind,
    pub ownership: Ownership,
}

/// Source of documents and sink for the translated copies.
///
/// `create_document` may be called concurrently for the same collection.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn list_documents(&self, collection: &Collection) -> Result<Vec<Document>>;

    async fn find_collection(&self, label: &str, kind: &DocumentKind) -> Result<Option<Collection>>;

    async fn create_collection(
        &self,
        label: &str,
        kind: &DocumentKind,
        ownership: Ownership,
    ) -> Result<Collection>;

    /// Store a document, assigning it a fresh identifier.
    async fn create_document(&self, collection: &Collection, document: Document) -> Result<Document>;
}

pub(crate) fn new_id() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    id[..16].to_string()
}

/// Give `document` a fresh `_id`, checking it belongs in `collection`.
pub(crate) fn assign_id(collection: &Collection, document: Document) -> Result<Document> {
    if document.kind() != &collection.kind {
        return Err(crate::error::TranslatorError::Storage(format!(
            "cannot store a {} document in {} collection {}",
            document.kind(),
            collection.kind,
            collection.label
        )));
    }
    let kind = document.kind().clone();
    let mut data = document.into_data();
    if let Some(fields) = data.as_object_mut() {
        fields.insert("_id".to_string(), serde_json::Value::String(new_id()));
    }
    Document::new(kind, data)
}
