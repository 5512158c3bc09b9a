//! Logger facade with per-entry outcome collection.
use std::path::PathBuf;
use std::sync::Mutex;

use super::subscriber::STAGE_TARGET;
use super::types::{Outcome, OutcomeEntry};

/// Structured logger used by command handlers.
///
/// Messages go through `tracing`, so they reach the console and, when
/// configured, `$XDG_CACHE_HOME/sto/<command>.log`.  Multi-entry commands
/// record one [`Outcome`] per entry and finish with
/// [`print_summary`](Self::print_summary).
#[derive(Debug)]
pub struct Logger {
    entries: Mutex<Vec<OutcomeEntry>>,
    log_file: Option<PathBuf>,
}

impl Logger {
    /// Create a logger.  `log_file` is only shown in the summary; the file
    /// itself is written by the subscriber.
    #[must_use]
    pub const fn new(log_file: Option<PathBuf>) -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            log_file,
        }
    }

    /// Return the log file path, if available.
    #[cfg(test)]
    pub const fn log_path(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }

    /// Return a clone of all recorded outcomes.
    #[must_use]
    pub fn entries(&self) -> Vec<OutcomeEntry> {
        self.entries.lock().map_or_else(|_| vec![], |g| g.clone())
    }
}

#[allow(clippy::unused_self)]
impl Logger {
    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Log a stage header.
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: STAGE_TARGET, "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message (console only when verbose).
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }
}

impl Logger {
    /// Record the outcome for one entry.
    pub fn record(&self, name: &str, outcome: Outcome, message: Option<&str>) {
        if let Ok(mut guard) = self.entries.lock() {
            guard.push(OutcomeEntry {
                name: name.to_string(),
                outcome,
                message: message.map(String::from),
            });
        }
    }

    /// Return `true` if any recorded entry failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failure_count() > 0
    }

    /// Count the failed entries.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.entries.lock().map_or(0, |guard| {
            guard
                .iter()
                .filter(|e| e.outcome == Outcome::Failed)
                .count()
        })
    }

    /// Print one line per recorded entry followed by the totals.
    pub fn print_summary(&self) {
        let entries = self.entries();
        if entries.is_empty() {
            return;
        }

        self.info("");
        self.stage("Summary");

        let mut changed = 0u32;
        let mut unchanged = 0u32;
        let mut skipped = 0u32;
        let mut failed = 0u32;

        for entry in &entries {
            let (icon, color) = match entry.outcome {
                Outcome::Changed => {
                    changed += 1;
                    ("✓", "\x1b[32m")
                }
                Outcome::Unchanged => {
                    unchanged += 1;
                    ("·", "\x1b[2m")
                }
                Outcome::Skipped => {
                    skipped += 1;
                    ("○", "\x1b[33m")
                }
                Outcome::Failed => {
                    failed += 1;
                    ("✗", "\x1b[31m")
                }
            };

            let suffix = entry
                .message
                .as_ref()
                .map_or_else(String::new, |msg| format!(" ({msg})"));

            self.info(&format!("{color}{icon} {}{suffix}\x1b[0m", entry.name));
        }

        self.info("");
        let total = changed + unchanged + skipped + failed;
        self.info(&format!(
            "{total} entries: \x1b[32m{changed} changed\x1b[0m, \x1b[2m{unchanged} unchanged\x1b[0m, \x1b[33m{skipped} skipped\x1b[0m, \x1b[31m{failed} failed\x1b[0m"
        ));

        if let Some(path) = &self.log_file {
            self.info(&format!("\x1b[2mlog: {}\x1b[0m", path.display()));
        }
    }
}
