use crate::config::{DEFAULT_BATCH_SIZE, DEFAULT_COOLDOWN_MS};
use crate::document::Document;
use crate::error::Result;
use crate::notify::Notifier;
use futures::stream::{FuturesUnordered, StreamExt};
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// Where the scheduler is in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running { batch: usize, of: usize },
    Cooldown { after: usize },
    Done,
}

/// Outcome of one document.
#[derive(Debug, Clone)]
pub struct DocumentOutcome {
    pub index: usize,
    pub name: String,
    pub error: Option<String>,
}

impl DocumentOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Aggregated result of a scheduler run.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub total: usize,
    pub processed: usize,
    pub batches: usize,
    /// Outcomes in source order.
    pub outcomes: Vec<DocumentOutcome>,
    pub elapsed: Duration,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

/// Runs a job over documents in fixed-size batches.
///
/// Jobs of one batch run concurrently and the next batch starts only once
/// all of them have finished. A failed job is reported and does not stop
/// the run.
#[derive(Debug, Clone)]
pub struct BatchScheduler {
    batch_size: usize,
    cooldown: Duration,
}

impl Default for BatchScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_SIZE, Duration::from_millis(DEFAULT_COOLDOWN_MS))
    }
}

impl BatchScheduler {
    pub fn new(batch_size: usize, cooldown: Duration) -> Self {
        Self {
            batch_size: batch_size.max(1),
            cooldown,
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn batch_count(&self, total: usize) -> usize {
        total.div_ceil(self.batch_size)
    }

    /// Run `job` on every document.
    ///
    /// After each batch the notifier receives the processed count. No
    /// cooldown follows the final batch.
    pub async fn run<F, Fut, T>(
        &self,
        documents: Vec<Document>,
        notifier: &dyn Notifier,
        job: F,
    ) -> BatchReport
    where
        F: Fn(Document) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let start_time = Instant::now();
        let total = documents.len();
        let batch_total = self.batch_count(total);
        let mut report = BatchReport {
            total,
            ..BatchReport::default()
        };
        let mut state = SchedulerState::Idle;
        debug!("Scheduler {:?}: {} documents in {} batches", state, total, batch_total);

        let job = &job;
        let mut remaining = documents.into_iter().enumerate().peekable();

        while remaining.peek().is_some() {
            let batch: Vec<(usize, Document)> = remaining.by_ref().take(self.batch_size).collect();
            report.batches += 1;
            state = SchedulerState::Running {
                batch: report.batches,
                of: batch_total,
            };
            debug!("Scheduler {:?}: {} documents", state, batch.len());

            let mut in_flight: FuturesUnordered<_> = batch
                .into_iter()
                .map(|(index, document)| async move {
                    let name = document.name().to_string();
                    let result = job(document).await;
                    (index, name, result)
                })
                .collect();

            let mut batch_outcomes = Vec::with_capacity(self.batch_size);
            while let Some((index, name, result)) = in_flight.next().await {
                let error = match result {
                    Ok(_) => {
                        debug!("Document {} ({:?}) done", index, name);
                        None
                    }
                    Err(e) => {
                        error!("Document {} ({:?}) failed: {}", index, name, e);
                        notifier.error(&format!("Error translating {}: {}", display_name(&name, index), e));
                        Some(e.to_string())
                    }
                };
                batch_outcomes.push(DocumentOutcome { index, name, error });
            }
            batch_outcomes.sort_by_key(|o| o.index);

            report.processed += batch_outcomes.len();
            report.outcomes.extend(batch_outcomes);

            notifier.progress(
                &format!("Translating... ({}/{})", report.processed, total),
                percent(report.processed, total),
            );

            if remaining.peek().is_some() && !self.cooldown.is_zero() {
                state = SchedulerState::Cooldown {
                    after: report.batches,
                };
                debug!("Scheduler {:?}: waiting {:?}", state, self.cooldown);
                tokio::time::sleep(self.cooldown).await;
            }
        }

        state = SchedulerState::Done;
        report.elapsed = start_time.elapsed();
        info!(
            "Scheduler {:?}: {}/{} documents succeeded in {} batches ({:.2}s)",
            state,
            report.succeeded(),
            total,
            report.batches,
            report.elapsed.as_secs_f64()
        );

        report
    }
}

fn display_name(name: &str, index: usize) -> String {
    if name.is_empty() {
        format!("document #{}", index + 1)
    } else {
        name.to_string()
    }
}

fn percent(processed: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((processed as f64 / total as f64) * 100.0).round() as u8
}
