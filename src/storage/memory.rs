use super::{assign_id, new_id, Collection, DocumentStore, Ownership};
use crate::document::{Document, DocumentKind};
use crate::error::{Result, TranslatorError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

/// In-memory store, safe for concurrent writes.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: Mutex<Vec<(Collection, Vec<Document>)>>,
    list_calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a collection holding `documents` as given.
    pub async fn add_collection(
        &self,
        label: &str,
        kind: DocumentKind,
        documents: Vec<Document>,
    ) -> Collection {
        let collection = Collection {
            id: new_id(),
            label: label.to_string(),
            kind,
            ownership: Ownership::default(),
        };
        self.collections
            .lock()
            .await
            .push((collection.clone(), documents));
        collection
    }

    pub async fn collections(&self) -> Vec<Collection> {
        self.collections
            .lock()
            .await
            .iter()
            .map(|(c, _)| c.clone())
            .collect()
    }

    pub async fn documents(&self, collection_id: &str) -> Vec<Document> {
        self.collections
            .lock()
            .await
            .iter()
            .find(|(c, _)| c.id == collection_id)
            .map(|(_, docs)| docs.clone())
            .unwrap_or_default()
    }

    /// Number of `list_documents` calls served so far.
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn list_documents(&self, collection: &Collection) -> Result<Vec<Document>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.collections
            .lock()
            .await
            .iter()
            .find(|(c, _)| c.id == collection.id)
            .map(|(_, docs)| docs.clone())
            .ok_or_else(|| TranslatorError::Storage(format!("unknown collection {}", collection.label)))
    }

    async fn find_collection(&self, label: &str, kind: &DocumentKind) -> Result<Option<Collection>> {
        Ok(self
            .collections
            .lock()
            .await
            .iter()
            .map(|(c, _)| c)
            .find(|c| c.label == label && &c.kind == kind)
            .cloned())
    }

    async fn create_collection(
        &self,
        label: &str,
        kind: &DocumentKind,
        ownership: Ownership,
    ) -> Result<Collection> {
        let collection = Collection {
            id: new_id(),
            label: label.to_string(),
            kind: kind.clone(),
            ownership,
        };
        self.collections
            .lock()
            .await
            .push((collection.clone(), Vec::new()));
        Ok(collection)
    }

    async fn create_document(&self, collection: &Collection, document: Document) -> Result<Document> {
        let document = assign_id(collection, document)?;
        let mut collections = self.collections.lock().await;
        let (_, documents) = collections
            .iter_mut()
            .find(|(c, _)| c.id == collection.id)
            .ok_or_else(|| TranslatorError::Storage(format!("unknown collection {}", collection.label)))?;
        documents.push(document.clone());
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_find_matches_label_and_kind() {
        let store = MemoryStore::new();
        store.add_collection("Spells", DocumentKind::Item, vec![]).await;

        assert!(store
            .find_collection("Spells", &DocumentKind::Item)
            .await
            .unwrap()
            .is_some());
        assert!(store
            .find_collection("Spells", &DocumentKind::Actor)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_create_and_list_documents() {
        let store = MemoryStore::new();
        let collection = store
            .create_collection("[FR] Items", &DocumentKind::Item, Ownership::default())
            .await
            .unwrap();

        let doc = Document::new(DocumentKind::Item, json!({"name": "Rope"})).unwrap();
        let created = store.create_document(&collection, doc).await.unwrap();

        let listed = store.list_documents(&collection).await.unwrap();
        assert_eq!(listed, vec![created]);
        assert_eq!(store.list_calls(), 1);
    }

    #[tokio::test]
    async fn test_unknown_collection() {
        let store = MemoryStore::new();
        let ghost = Collection {
            id: "missing".to_string(),
            label: "Ghost".to_string(),
            kind: DocumentKind::Item,
            ownership: Ownership::default(),
        };
        assert!(store.list_documents(&ghost).await.is_err());
    }
}
