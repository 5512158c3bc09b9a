//! Decision hook for destinations occupied by a regular file or directory.
use std::path::Path;

/// What to do when a non-symlink item occupies a link destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictDecision {
    /// Delete the item and create the symlink in its place.
    Overwrite,
    /// Leave the item alone; the operation fails with a conflict error.
    Skip,
}

/// Supplied by callers that may allow a conflicting item to be replaced.
///
/// The engine calls [`on_conflict`](Self::on_conflict) at most once per link,
/// and only when the destination holds something that is not a symlink.
/// Foreign symlinks are never offered for replacement.
#[cfg_attr(test, mockall::automock)]
pub trait ConflictResolver {
    /// Decide whether the item at `destination` may be deleted.
    fn on_conflict(&mut self, destination: &Path) -> ConflictDecision;
}

impl<F> ConflictResolver for F
where
    F: FnMut(&Path) -> ConflictDecision,
{
    fn on_conflict(&mut self, destination: &Path) -> ConflictDecision {
        self(destination)
    }
}

/// Resolver that never deletes anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverOverwrite;

impl ConflictResolver for NeverOverwrite {
    fn on_conflict(&mut self, _destination: &Path) -> ConflictDecision {
        ConflictDecision::Skip
    }
}

/// Resolver that always deletes the conflicting item (`--force`).
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysOverwrite;

impl ConflictResolver for AlwaysOverwrite {
    fn on_conflict(&mut self, _destination: &Path) -> ConflictDecision {
        ConflictDecision::Overwrite
    }
}
