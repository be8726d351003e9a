//! User-facing notifications and progress reporting.

use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::sync::Mutex;
use tracing::{error, info, warn};

/// Receiver of run notifications. Calls never fail.
pub trait Notifier: Send + Sync {
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
    fn progress(&self, label: &str, percent: u8);
}

/// Forwards notifications to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn info(&self, message: &str) {
        info!("{}", message);
    }

    fn warn(&self, message: &str) {
        warn!("{}", message);
    }

    fn error(&self, message: &str) {
        error!("{}", message);
    }

    fn progress(&self, label: &str, percent: u8) {
        info!("{} [{}%]", label, percent);
    }
}

/// Terminal notifier with a progress bar.
///
/// Messages go above the bar while it is drawn. When the bar is hidden
/// (stderr is not a terminal, or [`ConsoleNotifier::hidden`]) they are
/// written as plain lines instead.
pub struct ConsoleNotifier {
    bar: ProgressBar,
    fallback: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleNotifier {
    pub fn new() -> Self {
        let bar = ProgressBar::new(100);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>3}% {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Self::with_output(bar, Box::new(Term::stderr()))
    }

    /// A notifier that writes messages to stderr but draws no bar.
    pub fn hidden() -> Self {
        Self::with_output(ProgressBar::hidden(), Box::new(Term::stderr()))
    }

    fn with_output(bar: ProgressBar, fallback: Box<dyn Write + Send>) -> Self {
        Self {
            bar,
            fallback: Mutex::new(fallback),
        }
    }

    fn emit(&self, line: String) {
        if !self.bar.is_hidden() {
            self.bar.println(line);
            return;
        }
        if let Ok(mut out) = self.fallback.lock() {
            // Notifications never fail; a closed stderr drops the line.
            let _ = writeln!(out, "{}", line);
            let _ = out.flush();
        }
    }
}

impl Default for ConsoleNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for ConsoleNotifier {
    fn info(&self, message: &str) {
        self.emit(format!("{} {}", style("info").green().bold(), message));
    }

    fn warn(&self, message: &str) {
        self.emit(format!("{} {}", style("warn").yellow().bold(), message));
    }

    fn error(&self, message: &str) {
        self.emit(format!("{} {}", style("error").red().bold(), message));
    }

    fn progress(&self, label: &str, percent: u8) {
        self.bar.set_position(u64::from(percent.min(100)));
        self.bar.set_message(label.to_string());
        if percent >= 100 {
            self.bar.finish();
        }
    }
}
