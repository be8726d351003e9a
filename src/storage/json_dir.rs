//! Collections stored as JSON files in a directory.
//!
//! Each collection is one `<id>.json` file:
//!
//! ```json
//! {"id": "items", "label": "Items", "type": "Item",
//!  "ownership": {"PLAYER": "OBSERVER"}, "documents": [{"_id": "...", "name": "..."}]}
//! ```

use super::{assign_id, Collection, DocumentStore, Ownership};
use crate::document::{Document, DocumentKind};
use crate::error::{Result, TranslatorError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};

#[derive(Debug, Serialize, Deserialize)]
struct CollectionFile {
    id: String,
    label: String,
    #[serde(rename = "type")]
    kind: DocumentKind,
    #[serde(default)]
    ownership: Ownership,
    #[serde(default)]
    documents: Vec<Value>,
}

impl CollectionFile {
    fn collection(&self) -> Collection {
        Collection {
            id: self.id.clone(),
            label: self.label.clone(),
            kind: self.kind.clone(),
            ownership: self.ownership.clone(),
        }
    }
}

/// Store backed by a directory of collection files.
///
/// Writes go through a single lock, so concurrent `create_document` calls
/// are applied one after another.
#[derive(Debug)]
pub struct JsonDirStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonDirStore {
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    /// Look up a collection by label alone.
    pub async fn collection_by_label(&self, label: &str) -> Result<Collection> {
        self.read_all()
            .await?
            .into_iter()
            .find(|f| f.label == label)
            .map(|f| f.collection())
            .ok_or_else(|| TranslatorError::Storage(format!("Compendium not found: {}", label)))
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.root.join(format!("{}.json", id))
    }

    async fn read_file(&self, path: &Path) -> Result<CollectionFile> {
        let contents = fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&contents)?)
    }

    async fn read_all(&self) -> Result<Vec<CollectionFile>> {
        let mut files = Vec::new();
        let mut entries = fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match self.read_file(&path).await {
                Ok(file) => files.push(file),
                Err(e) => warn!("Skipping unreadable collection file {:?}: {}", path, e),
            }
        }
        files.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(files)
    }

    async fn write_file(&self, file: &CollectionFile) -> Result<()> {
        let path = self.path_for(&file.id);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(file)?).await?;
        fs::rename(&tmp, &path).await?;
        debug!("Wrote {} documents to {:?}", file.documents.len(), path);
        Ok(())
    }

    async fn unused_id(&self, label: &str) -> Result<String> {
        let base = slugify(label);
        let mut id = base.clone();
        let mut n = 2;
        while fs::try_exists(self.path_for(&id)).await? {
            id = format!("{}-{}", base, n);
            n += 1;
        }
        Ok(id)
    }
}

/// Lowercase ASCII alphanumerics joined by single dashes.
fn slugify(label: &str) -> String {
    let slug = label
        .to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    if slug.is_empty() {
        "compendium".to_string()
    } else {
        slug
    }
}

#[async_trait]
impl DocumentStore for JsonDirStore {
    async fn list_documents(&self, collection: &Collection) -> Result<Vec<Document>> {
        let file = self.read_file(&self.path_for(&collection.id)).await?;
        file.documents
            .into_iter()
            .map(|data| Document::new(file.kind.clone(), data))
            .collect()
    }

    async fn find_collection(&self, label: &str, kind: &DocumentKind) -> Result<Option<Collection>> {
        Ok(self
            .read_all()
            .await?
            .into_iter()
            .find(|f| f.label == label && &f.kind == kind)
            .map(|f| f.collection()))
    }

    async fn create_collection(
        &self,
        label: &str,
        kind: &DocumentKind,
        ownership: Ownership,
    ) -> Result<Collection> {
        let _guard = self.write_lock.lock().await;
        let file = CollectionFile {
            id: self.unused_id(label).await?,
            label: label.to_string(),
            kind: kind.clone(),
            ownership,
            documents: Vec::new(),
        };
        self.write_file(&file).await?;
        Ok(file.collection())
    }

    async fn create_document(&self, collection: &Collection, document: Document) -> Result<Document> {
        let document = assign_id(collection, document)?;
        let _guard = self.write_lock.lock().await;
        let mut file = self.read_file(&self.path_for(&collection.id)).await?;
        file.documents.push(document.data().clone());
        self.write_file(&file).await?;
        Ok(document)
    }
}
