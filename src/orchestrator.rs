use crate::config::{Config, ProviderConfig};
use crate::document::DocumentKind;
use crate::error::Result;
use crate::job::translate_document;
use crate::notify::Notifier;
use crate::scheduler::{BatchScheduler, DocumentOutcome};
use crate::storage::{Collection, DocumentStore, Ownership};
use crate::translate::{create_client, TranslationClient};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Completed,
    /// The source had no documents; nothing was created.
    EmptySource,
}

/// Summary of a compendium translation.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub status: RunStatus,
    pub source_label: String,
    pub target_label: String,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub batches: usize,
    pub failures: Vec<DocumentOutcome>,
    pub total_time: Duration,
}

/// Translates whole collections into new, prefixed collections.
pub struct Orchestrator {
    provider: ProviderConfig,
    target_prefix: String,
    scheduler: BatchScheduler,
    store: Arc<dyn DocumentStore>,
    notifier: Arc<dyn Notifier>,
    client: Option<Arc<dyn TranslationClient>>,
}

impl Orchestrator {
    pub fn new(config: &Config, store: Arc<dyn DocumentStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            provider: config.provider_config(),
            target_prefix: config.target_prefix.clone(),
            scheduler: BatchScheduler::new(config.batch_size, config.cooldown()),
            store,
            notifier,
            client: None,
        }
    }

    /// Use `client` instead of building one from the provider settings.
    pub fn with_client(mut self, client: Arc<dyn TranslationClient>) -> Self {
        self.client = Some(client);
        self
    }

    pub fn target_label(&self, source_label: &str) -> String {
        format!("{}{}", self.target_prefix, source_label)
    }

    /// Translate every document of `source` into the prefixed target collection.
    ///
    /// Configuration problems abort before anything is read. Individual
    /// document failures are reported and leave the document out of the target.
    pub async fn translate_compendium(&self, source: &Collection) -> Result<RunSummary> {
        let start_time = Instant::now();
        let client = match self.prepare_client() {
            Ok(client) => client,
            Err(e) => {
                self.notifier.error(&format!(
                    "Please configure the translation provider before translating: {}",
                    e
                ));
                return Err(e);
            }
        };

        let target_label = self.target_label(&source.label);
        self.notifier
            .info(&format!("Starting translation of {}...", source.label));

        let documents = self.store.list_documents(source).await?;
        if documents.is_empty() {
            self.notifier
                .warn(&format!("Source compendium {} is empty.", source.label));
            return Ok(RunSummary {
                status: RunStatus::EmptySource,
                source_label: source.label.clone(),
                target_label,
                total: 0,
                succeeded: 0,
                failed: 0,
                batches: 0,
                failures: Vec::new(),
                total_time: start_time.elapsed(),
            });
        }

        let destination = match self.resolve_destination(&target_label, &source.kind).await {
            Ok(collection) => collection,
            Err(e) => {
                self.notifier.error(&format!(
                    "Failed to create destination compendium {}: {}",
                    target_label, e
                ));
                return Err(e);
            }
        };

        info!(
            "Translating {} {} documents from {:?} into {:?} with {}",
            documents.len(),
            source.kind,
            source.label,
            destination.label,
            client.name()
        );

        self.notifier.progress("Translating...", 0);

        let client = client.as_ref();
        let store = self.store.as_ref();
        let destination_ref = &destination;
        let prefix = self.target_prefix.as_str();

        let report = self
            .scheduler
            .run(documents, self.notifier.as_ref(), move |document| async move {
                let translated = translate_document(client, &document, prefix).await?;
                store.create_document(destination_ref, translated).await
            })
            .await;

        self.notifier.progress("Translation complete!", 100);
        self.notifier
            .info(&format!("Created compendium: {}", destination.label));

        let succeeded = report.succeeded();
        let failed = report.failed();
        Ok(RunSummary {
            status: RunStatus::Completed,
            source_label: source.label.clone(),
            target_label: destination.label.clone(),
            total: report.total,
            succeeded,
            failed,
            batches: report.batches,
            failures: report
                .outcomes
                .into_iter()
                .filter(|o| !o.is_success())
                .collect(),
            total_time: start_time.elapsed(),
        })
    }

    fn prepare_client(&self) -> Result<Arc<dyn TranslationClient>> {
        self.provider.validate()?;
        match &self.client {
            Some(client) => Ok(client.clone()),
            None => Ok(Arc::from(create_client(&self.provider)?)),
        }
    }

    async fn resolve_destination(&self, label: &str, kind: &DocumentKind) -> Result<Collection> {
        if let Some(existing) = self.store.find_collection(label, kind).await? {
            debug!("Reusing destination compendium {:?}", existing.label);
            return Ok(existing);
        }
        debug!("Creating destination compendium {:?}", label);
        self.store
            .create_collection(label, kind, Ownership::default())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::TracingNotifier;
    use crate::storage::MemoryStore;

    #[test]
    fn test_target_label() {
        let orchestrator = Orchestrator::new(
            &Config::default(),
            Arc::new(MemoryStore::new()),
            Arc::new(TracingNotifier),
        );
        assert_eq!(orchestrator.target_label("Spells"), "[FR] Spells");
    }

    #[test]
    fn test_prepare_client_requires_key() {
        let orchestrator = Orchestrator::new(
            &Config::default(),
            Arc::new(MemoryStore::new()),
            Arc::new(TracingNotifier),
        );
        assert!(orchestrator.prepare_client().is_err());
    }

    #[test]
    fn test_prepare_client_from_config() {
        let config = Config {
            api_key: Some("sk-test".to_string()),
            ..Config::default()
        };
        let orchestrator = Orchestrator::new(
            &config,
            Arc::new(MemoryStore::new()),
            Arc::new(TracingNotifier),
        );
        assert_eq!(orchestrator.prepare_client().unwrap().name(), "OpenAI");
    }
}
