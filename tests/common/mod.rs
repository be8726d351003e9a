//! Shared fixtures for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use compendium_translator::notify::Notifier;
use compendium_translator::storage::{Collection, DocumentStore, MemoryStore, Ownership};
use compendium_translator::translate::TranslationClient;
use compendium_translator::{Document, DocumentKind, Result, TranslatorError};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Prefixes every input with `[translated] `, optionally failing on one input.
pub struct MockTranslator {
    pub calls: AtomicUsize,
    fail_when_contains: Option<String>,
    delay: Duration,
}

impl MockTranslator {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_when_contains: None,
            delay: Duration::from_millis(5),
        }
    }

    pub fn failing_on(needle: &str) -> Self {
        Self {
            fail_when_contains: Some(needle.to_string()),
            ..Self::new()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranslationClient for MockTranslator {
    async fn translate(&self, text: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;

        if let Some(ref needle) = self.fail_when_contains {
            if text.contains(needle.as_str()) {
                return Err(TranslatorError::Provider(
                    "OpenAI API error (500 Internal Server Error): mock failure".to_string(),
                ));
            }
        }
        Ok(format!("[translated] {}", text))
    }

    fn name(&self) -> &'static str {
        "Mock"
    }
}

/// Collects every notification for later inspection.
#[derive(Default)]
pub struct RecordingNotifier {
    pub infos: Mutex<Vec<String>>,
    pub warnings: Mutex<Vec<String>>,
    pub errors: Mutex<Vec<String>>,
    pub progress: Mutex<Vec<(String, u8)>>,
}

impl RecordingNotifier {
    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.warnings.lock().unwrap().clone()
    }

    pub fn infos(&self) -> Vec<String> {
        self.infos.lock().unwrap().clone()
    }

    pub fn progress(&self) -> Vec<(String, u8)> {
        self.progress.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn info(&self, message: &str) {
        self.infos.lock().unwrap().push(message.to_string());
    }

    fn warn(&self, message: &str) {
        self.warnings.lock().unwrap().push(message.to_string());
    }

    fn error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }

    fn progress(&self, label: &str, percent: u8) {
        self.progress
            .lock()
            .unwrap()
            .push((label.to_string(), percent));
    }
}

/// Store whose collections can be read but never created.
pub struct ReadOnlyStore {
    pub inner: MemoryStore,
    pub documents_created: AtomicUsize,
}

impl ReadOnlyStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            documents_created: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl DocumentStore for ReadOnlyStore {
    async fn list_documents(&self, collection: &Collection) -> Result<Vec<Document>> {
        self.inner.list_documents(collection).await
    }

    async fn find_collection(&self, label: &str, kind: &DocumentKind) -> Result<Option<Collection>> {
        self.inner.find_collection(label, kind).await
    }

    async fn create_collection(
        &self,
        label: &str,
        _kind: &DocumentKind,
        _ownership: Ownership,
    ) -> Result<Collection> {
        Err(TranslatorError::Storage(format!(
            "permission denied creating {}",
            label
        )))
    }

    async fn create_document(&self, collection: &Collection, document: Document) -> Result<Document> {
        self.documents_created.fetch_add(1, Ordering::SeqCst);
        self.inner.create_document(collection, document).await
    }
}

pub fn item(id: &str, name: &str, description: &str) -> Document {
    Document::new(
        DocumentKind::Item,
        json!({
            "_id": id,
            "name": name,
            "type": "equipment",
            "img": format!("icons/{}.webp", id),
            "folder": "folder01",
            "sort": 100,
            "system": {
                "description": {"value": description, "chat": ""},
                "price": {"value": 5, "denomination": "gp"},
                "weight": 1.5
            },
            "flags": {"ddb": {"id": 4242}}
        }),
    )
    .unwrap()
}

pub fn journal(id: &str, name: &str) -> Document {
    Document::new(
        DocumentKind::JournalEntry,
        json!({
            "_id": id,
            "name": name,
            "pages": [
                {"_id": "page1", "name": "Intro", "type": "text", "text": {"content": "<p>Welcome</p>", "format": 1}},
                {"_id": "page2", "name": "Map", "type": "image", "src": "map.webp", "image": {"caption": "Region map"}}
            ]
        }),
    )
    .unwrap()
}

pub fn actor(id: &str, name: &str, biography: Value) -> Document {
    Document::new(
        DocumentKind::Actor,
        json!({
            "_id": id,
            "name": name,
            "type": "npc",
            "system": {"details": {"biography": {"value": biography}}, "attributes": {"hp": {"value": 7}}}
        }),
    )
    .unwrap()
}
