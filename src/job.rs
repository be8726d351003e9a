//! Translation of a single document.

use crate::document::{extract_fields, rebuild, Document, FieldPath, TranslatableField, TranslationPatch};
use crate::error::Result;
use crate::translate::TranslationClient;
use tracing::{debug, warn};

/// Resolution of one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldOutcome {
    Translated(String),
    Failed(String),
}

/// The fields of one document and what became of each of them.
#[derive(Debug)]
pub struct TranslationJob<'a> {
    document: &'a Document,
    fields: Vec<TranslatableField>,
    outcomes: Vec<(FieldPath, FieldOutcome)>,
}

impl<'a> TranslationJob<'a> {
    pub fn new(document: &'a Document) -> Self {
        Self {
            document,
            fields: extract_fields(document),
            outcomes: Vec::new(),
        }
    }

    pub fn fields(&self) -> &[TranslatableField] {
        &self.fields
    }

    pub fn outcomes(&self) -> &[(FieldPath, FieldOutcome)] {
        &self.outcomes
    }

    /// Translate the fields in order, stopping at the first failure.
    pub async fn resolve(&mut self, client: &dyn TranslationClient) -> Result<()> {
        for field in &self.fields {
            match client.translate(&field.text).await {
                Ok(text) => {
                    self.outcomes
                        .push((field.path.clone(), FieldOutcome::Translated(text)));
                }
                Err(e) => {
                    warn!(
                        "Field {} of {:?} failed: {}",
                        field.path,
                        self.document.name(),
                        e
                    );
                    self.outcomes
                        .push((field.path.clone(), FieldOutcome::Failed(e.to_string())));
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    /// The translated fields resolved so far.
    pub fn patch(&self) -> TranslationPatch {
        self.outcomes
            .iter()
            .filter_map(|(path, outcome)| match outcome {
                FieldOutcome::Translated(text) => Some((path.clone(), text.clone())),
                FieldOutcome::Failed(_) => None,
            })
            .collect()
    }
}

/// Translate `document` and build its renamed, identity-free copy.
pub async fn translate_document(
    client: &dyn TranslationClient,
    document: &Document,
    name_prefix: &str,
) -> Result<Document> {
    let mut job = TranslationJob::new(document);
    debug!(
        "Translating {} field(s) of {:?}",
        job.fields().len(),
        document.name()
    );
    job.resolve(client).await?;
    rebuild(document, &job.patch(), name_prefix)
}
