pub mod extract;
pub mod rebuild;

pub use extract::{extract_fields, is_translatable, TranslatableField};
pub use rebuild::{rebuild, IDENTITY_KEYS};

use crate::error::{Result, TranslatorError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Kind of document stored in a collection.
///
/// Unknown kinds are carried through untouched so that collections of any
/// type can be copied, they just have nothing to translate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DocumentKind {
    Item,
    JournalEntry,
    Actor,
    Other(String),
}

impl DocumentKind {
    pub fn as_str(&self) -> &str {
        match self {
            DocumentKind::Item => "Item",
            DocumentKind::JournalEntry => "JournalEntry",
            DocumentKind::Actor => "Actor",
            DocumentKind::Other(name) => name,
        }
    }
}

impl From<String> for DocumentKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Item" => DocumentKind::Item,
            "JournalEntry" => DocumentKind::JournalEntry,
            "Actor" => DocumentKind::Actor,
            _ => DocumentKind::Other(s),
        }
    }
}

impl From<&str> for DocumentKind {
    fn from(s: &str) -> Self {
        DocumentKind::from(s.to_string())
    }
}

impl From<DocumentKind> for String {
    fn from(kind: DocumentKind) -> Self {
        kind.as_str().to_string()
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One step of a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// Location of a value inside a document's field tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    /// Parse a dotted path such as `pages.0.text.content`.
    ///
    /// All-digit segments are array indices.
    pub fn parse(dotted: &str) -> Self {
        let segments = dotted
            .split('.')
            .filter(|s| !s.is_empty())
            .map(|s| match s.parse::<usize>() {
                Ok(i) if s.bytes().all(|b| b.is_ascii_digit()) => PathSegment::Index(i),
                _ => PathSegment::Key(s.to_string()),
            })
            .collect();
        Self(segments)
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.0.push(PathSegment::Key(key.into()));
        self
    }

    pub fn index(mut self, index: usize) -> Self {
        self.0.push(PathSegment::Index(index));
        self
    }

    /// The remainder of this path if it starts with `prefix`.
    pub fn strip_prefix(&self, prefix: &FieldPath) -> Option<FieldPath> {
        self.0
            .starts_with(&prefix.0)
            .then(|| FieldPath(self.0[prefix.0.len()..].to_vec()))
    }

    pub fn lookup<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        self.0.iter().try_fold(root, |value, segment| match segment {
            PathSegment::Key(k) => value.as_object()?.get(k),
            PathSegment::Index(i) => value.as_array()?.get(*i),
        })
    }

    /// Replace the value at this path, creating missing object keys on the way.
    ///
    /// Fails when the path crosses a non-container value or an index out of
    /// bounds.
    pub fn assign(&self, root: &mut Value, new_value: Value) -> Result<()> {
        let Some((last, parents)) = self.0.split_last() else {
            *root = new_value;
            return Ok(());
        };

        let mut current = root;
        for segment in parents {
            current = match segment {
                PathSegment::Key(k) => current
                    .as_object_mut()
                    .ok_or_else(|| self.not_a_container())?
                    .entry(k.clone())
                    .or_insert_with(|| Value::Object(Map::new())),
                PathSegment::Index(i) => current
                    .as_array_mut()
                    .and_then(|a| a.get_mut(*i))
                    .ok_or_else(|| self.not_a_container())?,
            };
        }

        match last {
            PathSegment::Key(k) => {
                current
                    .as_object_mut()
                    .ok_or_else(|| self.not_a_container())?
                    .insert(k.clone(), new_value);
            }
            PathSegment::Index(i) => {
                let slot = current
                    .as_array_mut()
                    .and_then(|a| a.get_mut(*i))
                    .ok_or_else(|| self.not_a_container())?;
                *slot = new_value;
            }
        }
        Ok(())
    }

    fn not_a_container(&self) -> TranslatorError {
        TranslatorError::Document(format!("cannot assign to field path {}", self))
    }
}

impl std::fmt::Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            match segment {
                PathSegment::Key(k) => f.write_str(k)?,
                PathSegment::Index(idx) => write!(f, "{}", idx)?,
            }
        }
        Ok(())
    }
}

/// A typed record read from, or written to, a collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    kind: DocumentKind,
    data: Value,
}

impl Document {
    /// Wrap a JSON object as a document of the given kind.
    pub fn new(kind: DocumentKind, data: Value) -> Result<Self> {
        if !data.is_object() {
            return Err(TranslatorError::Document(format!(
                "{} document must be a JSON object",
                kind
            )));
        }
        Ok(Self { kind, data })
    }

    pub fn kind(&self) -> &DocumentKind {
        &self.kind
    }

    pub fn id(&self) -> Option<&str> {
        self.data.get("_id").and_then(Value::as_str)
    }

    pub fn name(&self) -> &str {
        self.data.get("name").and_then(Value::as_str).unwrap_or_default()
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn get(&self, path: &FieldPath) -> Option<&Value> {
        path.lookup(&self.data)
    }

    pub fn into_data(self) -> Value {
        self.data
    }
}

/// Translated text keyed by the field path it replaces.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranslationPatch {
    entries: Vec<(FieldPath, String)>,
}

impl TranslationPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: FieldPath, text: impl Into<String>) {
        let text = text.into();
        match self.entries.iter_mut().find(|(p, _)| *p == path) {
            Some(entry) => entry.1 = text,
            None => self.entries.push((path, text)),
        }
    }

    pub fn get(&self, path: &FieldPath) -> Option<&str> {
        self.entries
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, t)| t.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldPath, &str)> {
        self.entries.iter().map(|(p, t)| (p, t.as_str()))
    }
}

impl FromIterator<(FieldPath, String)> for TranslationPatch {
    fn from_iter<I: IntoIterator<Item = (FieldPath, String)>>(iter: I) -> Self {
        let mut patch = TranslationPatch::new();
        for (path, text) in iter {
            patch.insert(path, text);
        }
        patch
    }
}
