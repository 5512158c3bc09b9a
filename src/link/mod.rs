//! Link state machine: classify and reconcile one source/destination pair.
//!
//! A [`Link`] is derived from an entry at the moment of use and never
//! persisted.  [`Link::classify`] compares what is on disk against the
//! declared pair; [`Link::apply`], [`Link::overwrite`] and [`Link::unapply`]
//! move the destination towards (or away from) the linked state and are
//! idempotent.
pub mod conflict;
pub mod fs;

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

pub use conflict::{AlwaysOverwrite, ConflictDecision, ConflictResolver, NeverOverwrite};

use crate::error::{Result, StoreError};

/// Relationship between a declared source and its destination on disk.
///
/// # Examples
///
/// ```
/// use std::path::PathBuf;
/// use sto_cli::link::LinkState;
///
/// assert_eq!(LinkState::Linked.to_string(), "linked");
/// let foreign = LinkState::ConflictingLink { target: PathBuf::from("/elsewhere") };
/// assert_eq!(foreign.to_string(), "conflictingLink");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkState {
    /// The destination is a symlink pointing exactly at the source.
    Linked,
    /// Nothing exists at the destination.
    Unlinked,
    /// A regular file or directory occupies the destination.
    ConflictingItem,
    /// A symlink at the destination points somewhere else.
    ConflictingLink {
        /// Where the foreign symlink points.
        target: PathBuf,
    },
    /// The source does not exist.
    SourceMissing,
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Linked => "linked",
            Self::Unlinked => "unlinked",
            Self::ConflictingItem => "conflictingItem",
            Self::ConflictingLink { .. } => "conflictingLink",
            Self::SourceMissing => "sourceMissing",
        };
        f.write_str(name)
    }
}

impl LinkState {
    /// Collapse the state to "is it linked", turning the problem states into
    /// their typed errors.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::SourceMissing`], [`StoreError::ConflictingItem`]
    /// or [`StoreError::ConflictingLink`] for the corresponding states.
    pub fn check(self, link: &Link) -> Result<bool> {
        match self {
            Self::Linked => Ok(true),
            Self::Unlinked => Ok(false),
            Self::ConflictingItem => Err(StoreError::ConflictingItem(link.destination.clone())),
            Self::ConflictingLink { target } => Err(StoreError::ConflictingLink {
                destination: link.destination.clone(),
                target,
            }),
            Self::SourceMissing => Err(StoreError::SourceMissing(link.source.clone())),
        }
    }
}

/// What a reconciliation call did to the destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkChange {
    /// A symlink was created where nothing existed.
    Created,
    /// A conflicting item was deleted and replaced by the symlink.
    Replaced,
    /// The symlink was removed.
    Removed,
    /// The destination was already in the requested state.
    AlreadyCorrect,
    /// `unapply` left a non-linked destination alone.
    Untouched(LinkState),
}

/// An absolute source/destination pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// What the symlink points to (inside the store root).
    pub source: PathBuf,
    /// Where the symlink lives.
    pub destination: PathBuf,
}

impl Link {
    /// Create a link between two absolute paths.
    #[must_use]
    pub const fn new(source: PathBuf, destination: PathBuf) -> Self {
        Self {
            source,
            destination,
        }
    }

    /// `destination -> source`, for log lines.
    #[must_use]
    pub fn description(&self) -> String {
        format!("{} -> {}", self.destination.display(), self.source.display())
    }

    /// Inspect the filesystem and classify this link.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] for stat or readlink failures other than
    /// "not found".
    pub fn classify(&self) -> Result<LinkState> {
        match std::fs::metadata(&self.source) {
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(LinkState::SourceMissing),
            Err(e) => return Err(StoreError::io("reading stat", &self.source, e)),
        }

        let meta = match std::fs::symlink_metadata(&self.destination) {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(LinkState::Unlinked),
            Err(e) => return Err(StoreError::io("reading lstat", &self.destination, e)),
        };
        if !meta.file_type().is_symlink() {
            return Ok(LinkState::ConflictingItem);
        }

        let target = std::fs::read_link(&self.destination)
            .map_err(|e| StoreError::io("reading link", &self.destination, e))?;
        if target.as_os_str() == self.source.as_os_str() {
            Ok(LinkState::Linked)
        } else {
            Ok(LinkState::ConflictingLink { target })
        }
    }

    /// Create the symlink if the destination is free.
    ///
    /// # Errors
    ///
    /// Returns a typed error for the conflict and missing-source states, or
    /// [`StoreError::Io`] if the symlink cannot be created.
    pub fn apply(&self) -> Result<LinkChange> {
        let state = self.classify()?;
        self.apply_state(state)
    }

    /// Like [`apply`](Self::apply), but delete a conflicting regular file or
    /// directory first.  Foreign symlinks are still an error.
    ///
    /// # Errors
    ///
    /// Same as [`apply`](Self::apply), plus removal failures.
    /// [`StoreError::InvalidPrecondition`] if the destination is the source
    /// or one of its ancestors; nothing is deleted in that case.
    pub fn overwrite(&self) -> Result<LinkChange> {
        if self.source.starts_with(&self.destination) {
            return Err(StoreError::InvalidPrecondition(format!(
                "refusing to replace {}: it holds the source {}",
                self.destination.display(),
                self.source.display()
            )));
        }
        match self.classify()? {
            LinkState::ConflictingItem => {
                tracing::debug!("replacing conflicting item at {}", self.destination.display());
                fs::remove_item(&self.destination)?;
                fs::create_symlink(&self.source, &self.destination)?;
                Ok(LinkChange::Replaced)
            }
            state => self.apply_state(state),
        }
    }

    /// Remove the symlink if (and only if) it points at the source.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if classification or removal fails.
    pub fn unapply(&self) -> Result<LinkChange> {
        match self.classify()? {
            LinkState::Linked => {
                fs::remove_symlink(&self.destination)?;
                Ok(LinkChange::Removed)
            }
            state => Ok(LinkChange::Untouched(state)),
        }
    }

    fn apply_state(&self, state: LinkState) -> Result<LinkChange> {
        if state.check(self)? {
            return Ok(LinkChange::AlreadyCorrect);
        }
        fs::ensure_parent_dir(&self.destination)?;
        fs::create_symlink(&self.source, &self.destination)?;
        Ok(LinkChange::Created)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    struct Fixture {
        _dir: tempfile::TempDir,
        link: Link,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("root").join("bashrc");
        std::fs::create_dir_all(source.parent().unwrap()).unwrap();
        std::fs::write(&source, "export A=1").unwrap();
        let destination = dir.path().join("home").join(".bashrc");
        Fixture {
            link: Link::new(source, destination),
            _dir: dir,
        }
    }

    // ------------------------------------------------------------------
    // classify
    // ------------------------------------------------------------------

    #[test]
    fn classify_free_destination_is_unlinked() {
        let f = fixture();
        assert_eq!(f.link.classify().unwrap(), LinkState::Unlinked);
    }

    #[test]
    fn classify_missing_source_wins_over_destination() {
        let f = fixture();
        std::fs::remove_file(&f.link.source).unwrap();
        assert_eq!(f.link.classify().unwrap(), LinkState::SourceMissing);
    }

    #[test]
    fn classify_regular_file_is_conflicting_item() {
        let f = fixture();
        std::fs::create_dir_all(f.link.destination.parent().unwrap()).unwrap();
        std::fs::write(&f.link.destination, "user data").unwrap();
        assert_eq!(f.link.classify().unwrap(), LinkState::ConflictingItem);
    }

    #[test]
    fn classify_foreign_symlink_carries_target() {
        let f = fixture();
        std::fs::create_dir_all(f.link.destination.parent().unwrap()).unwrap();
        let other = PathBuf::from("/nonexistent/elsewhere");
        fs::create_symlink(&other, &f.link.destination).unwrap();
        assert_eq!(
            f.link.classify().unwrap(),
            LinkState::ConflictingLink { target: other }
        );
    }

    #[test]
    fn classify_compares_targets_byte_for_byte() {
        let f = fixture();
        std::fs::create_dir_all(f.link.destination.parent().unwrap()).unwrap();
        // Same file through a different spelling is still foreign.
        let respelled = f.link.source.parent().unwrap().join(".").join("bashrc");
        fs::create_symlink(&respelled, &f.link.destination).unwrap();
        assert!(matches!(
            f.link.classify().unwrap(),
            LinkState::ConflictingLink { .. }
        ));
    }

    // ------------------------------------------------------------------
    // apply / overwrite
    // ------------------------------------------------------------------

    #[test]
    fn apply_creates_parent_and_symlink() {
        let f = fixture();
        assert_eq!(f.link.apply().unwrap(), LinkChange::Created);
        assert_eq!(f.link.classify().unwrap(), LinkState::Linked);
        assert_eq!(std::fs::read_link(&f.link.destination).unwrap(), f.link.source);
    }

    #[test]
    fn apply_is_idempotent() {
        let f = fixture();
        f.link.apply().unwrap();
        assert_eq!(f.link.apply().unwrap(), LinkChange::AlreadyCorrect);
    }

    #[test]
    fn apply_refuses_conflicting_item() {
        let f = fixture();
        std::fs::create_dir_all(f.link.destination.parent().unwrap()).unwrap();
        std::fs::write(&f.link.destination, "user data").unwrap();

        let err = f.link.apply().unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ConflictingItem);
        assert_eq!(
            std::fs::read_to_string(&f.link.destination).unwrap(),
            "user data"
        );
    }

    #[test]
    fn apply_refuses_missing_source() {
        let f = fixture();
        std::fs::remove_file(&f.link.source).unwrap();
        assert_eq!(f.link.apply().unwrap_err().kind(), ErrorKind::SourceMissing);
        assert!(f.link.destination.symlink_metadata().is_err());
    }

    #[test]
    fn overwrite_replaces_directory_tree() {
        let f = fixture();
        std::fs::create_dir_all(f.link.destination.join("nested")).unwrap();
        std::fs::write(f.link.destination.join("nested").join("f"), "x").unwrap();

        assert_eq!(f.link.overwrite().unwrap(), LinkChange::Replaced);
        assert_eq!(f.link.classify().unwrap(), LinkState::Linked);
    }

    #[test]
    fn overwrite_never_removes_foreign_symlink() {
        let f = fixture();
        std::fs::create_dir_all(f.link.destination.parent().unwrap()).unwrap();
        let other = PathBuf::from("/nonexistent/elsewhere");
        fs::create_symlink(&other, &f.link.destination).unwrap();

        let err = f.link.overwrite().unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ConflictingLink);
        assert_eq!(std::fs::read_link(&f.link.destination).unwrap(), other);
    }

    #[test]
    fn overwrite_refuses_destination_holding_source() {
        let f = fixture();
        let root = f.link.source.parent().unwrap().to_path_buf();
        for destination in [f.link.source.clone(), root.clone()] {
            let link = Link::new(f.link.source.clone(), destination.clone());

            let err = link.overwrite().unwrap_err();

            assert_eq!(err.kind(), ErrorKind::InvalidInput, "{}", destination.display());
            assert_eq!(std::fs::read_to_string(&f.link.source).unwrap(), "export A=1");
        }
        assert!(root.is_dir());
    }

    #[test]
    fn overwrite_on_free_destination_creates() {
        let f = fixture();
        assert_eq!(f.link.overwrite().unwrap(), LinkChange::Created);
    }

    // ------------------------------------------------------------------
    // unapply
    // ------------------------------------------------------------------

    #[test]
    fn unapply_removes_only_matching_link() {
        let f = fixture();
        f.link.apply().unwrap();
        assert_eq!(f.link.unapply().unwrap(), LinkChange::Removed);
        assert_eq!(f.link.classify().unwrap(), LinkState::Unlinked);
        assert!(f.link.source.exists());
    }

    #[test]
    fn unapply_leaves_conflicting_item() {
        let f = fixture();
        std::fs::create_dir_all(f.link.destination.parent().unwrap()).unwrap();
        std::fs::write(&f.link.destination, "user data").unwrap();

        assert_eq!(
            f.link.unapply().unwrap(),
            LinkChange::Untouched(LinkState::ConflictingItem)
        );
        assert!(f.link.destination.exists());
    }

    #[test]
    fn unapply_on_unlinked_is_noop() {
        let f = fixture();
        assert_eq!(
            f.link.unapply().unwrap(),
            LinkChange::Untouched(LinkState::Unlinked)
        );
    }

    #[test]
    fn check_maps_states_to_bool_or_error() {
        let f = fixture();
        assert!(LinkState::Linked.check(&f.link).unwrap());
        assert!(!LinkState::Unlinked.check(&f.link).unwrap());
        assert_eq!(
            LinkState::SourceMissing.check(&f.link).unwrap_err().kind(),
            ErrorKind::SourceMissing
        );
    }

    #[test]
    fn description_shows_destination_first() {
        let link = Link::new(PathBuf::from("/r/a"), PathBuf::from("/h/.a"));
        assert_eq!(link.description(), "/h/.a -> /r/a");
    }
}
