pub mod config;
pub mod document;
pub mod error;
pub mod job;
pub mod notify;
pub mod orchestrator;
pub mod scheduler;
pub mod storage;
pub mod translate;

pub use config::{Config, Provider, ProviderConfig};
pub use document::{Document, DocumentKind, FieldPath, TranslationPatch};
pub use error::{Result, TranslatorError};
pub use orchestrator::{Orchestrator, RunStatus, RunSummary};
