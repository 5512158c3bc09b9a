//! Per-entry outcome records for the run summary.

/// Result of one entry within a multi-entry command.
#[derive(Debug, Clone)]
pub struct OutcomeEntry {
    /// Entry (or profile) name.
    pub name: String,
    /// What happened.
    pub outcome: Outcome,
    /// Optional detail, e.g. the error text.
    pub message: Option<String>,
}

/// What a command did to one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The filesystem or store was changed.
    Changed,
    /// Already in the requested state.
    Unchanged,
    /// Left alone on purpose (declined prompt, conflicting item kept).
    Skipped,
    /// The operation failed.
    Failed,
}
