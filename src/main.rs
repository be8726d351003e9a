use anyhow::{Context, Result};
use clap::Parser;
use compendium_translator::config::{Config, Provider};
use compendium_translator::notify::ConsoleNotifier;
use compendium_translator::storage::JsonDirStore;
use compendium_translator::{Orchestrator, RunStatus, RunSummary};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "compendium-translator")]
#[command(version, about = "Translate document compendiums using AI")]
#[command(long_about = "Translate every document of a compendium into a new, prefixed compendium using OpenAI or Google Gemini.")]
struct Cli {
    /// Label of the compendium to translate
    source: String,

    /// Directory holding the compendium JSON files
    #[arg(short, long, default_value = ".")]
    library: PathBuf,

    /// Translation provider: openai, gemini (overrides the config file)
    #[arg(short, long)]
    provider: Option<String>,

    /// Model name (defaults per provider)
    #[arg(short, long)]
    model: Option<String>,

    /// Number of documents translated concurrently
    #[arg(short, long)]
    batch_size: Option<usize>,

    /// Pause between batches in milliseconds
    #[arg(long)]
    cooldown_ms: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}

fn apply_overrides(config: &mut Config, cli: &Cli) -> Result<()> {
    if let Some(ref provider) = cli.provider {
        config.provider = provider
            .parse::<Provider>()
            .map_err(|e| anyhow::anyhow!(e))?;
    }
    if let Some(ref model) = cli.model {
        config.model = Some(model.clone());
    }
    if let Some(size) = cli.batch_size {
        config.batch_size = size;
    }
    if let Some(ms) = cli.cooldown_ms {
        config.cooldown_ms = ms;
    }
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    println!();
    println!("  Source:     {}", summary.source_label);
    println!("  Target:     {}", summary.target_label);
    println!(
        "  Documents:  {} translated, {} failed, {} total",
        summary.succeeded, summary.failed, summary.total
    );
    println!("  Batches:    {}", summary.batches);
    println!("  Time:       {:.2}s", summary.total_time.as_secs_f64());
    for failure in &summary.failures {
        println!(
            "    ✗ {}: {}",
            failure.name,
            failure.error.as_deref().unwrap_or_default()
        );
    }
    println!();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let mut config = Config::load().context("Failed to load configuration")?;
    apply_overrides(&mut config, &cli)?;
    config
        .validate()
        .context("Configuration validation failed")?;

    info!("Library:  {}", cli.library.display());
    info!("Provider: {} ({})", config.provider, config.provider_config().model);

    let store = JsonDirStore::open(&cli.library)
        .await
        .with_context(|| format!("Failed to open library {}", cli.library.display()))?;
    let source = store
        .collection_by_label(&cli.source)
        .await
        .context("Failed to find source compendium")?;

    let orchestrator = Orchestrator::new(&config, Arc::new(store), Arc::new(ConsoleNotifier::new()));
    let summary = orchestrator
        .translate_compendium(&source)
        .await
        .context("Translation failed")?;

    if summary.status == RunStatus::Completed {
        print_summary(&summary);
    }

    Ok(())
}
