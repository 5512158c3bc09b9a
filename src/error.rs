//! Typed errors for the link reconciliation engine.
//!
//! Everything below the CLI returns [`StoreError`].  Command handlers convert
//! it to [`anyhow::Error`] through the standard `?` operator and decide how to
//! present it; the engine itself never prints or exits.
//!
//! # Error kinds
//!
//! ```text
//! ErrorKind
//! ├── NotFound         — root, store, entry or profile absent
//! ├── AlreadyExists    — store, entry, profile or move target collision
//! ├── NotADirectory    — root is not a directory
//! ├── OutsideRoot      — source or move target outside the managed root
//! ├── ConflictingItem  — non-symlink occupies the destination
//! ├── ConflictingLink  — symlink at the destination points elsewhere
//! ├── SourceMissing    — declared source absent from disk
//! ├── InvalidInput     — empty fields, relative paths, unknown home
//! ├── PartialFailure   — filesystem changed but a follow-up step failed
//! └── IoFailure        — unexpected stat/read/write error
//! ```
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the engine.
pub type Result<T, E = StoreError> = std::result::Result<T, E>;

/// Coarse classification of a [`StoreError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Root, store, entry or profile is absent.
    NotFound,
    /// Store, entry, profile or target path already exists.
    AlreadyExists,
    /// The root path is not a directory.
    NotADirectory,
    /// A path that must live under the root does not.
    OutsideRoot,
    /// A non-symlink occupies the destination.
    ConflictingItem,
    /// A symlink at the destination points somewhere else.
    ConflictingLink,
    /// The declared source does not exist on disk.
    SourceMissing,
    /// Caller supplied input that violates a precondition.
    InvalidInput,
    /// Part of a multi-step operation completed before a later step failed.
    PartialFailure,
    /// Unexpected filesystem or encoding failure.
    IoFailure,
}

/// Errors returned by path, link, store and profile operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The given root (or other required path) does not exist.
    #[error("path {} does not exist", .0.display())]
    PathNotFound(PathBuf),

    /// The given root exists but is not a directory.
    #[error("{} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    /// A store file is already present in the root.
    #[error("store at {} already exists", .0.display())]
    StoreAlreadyExists(PathBuf),

    /// No store file is present in the root.
    #[error("store at {} does not exist", .0.display())]
    StoreNotFound(PathBuf),

    /// A different entry is already recorded under this name.
    #[error("entry with name '{0}' already exists")]
    EntryAlreadyExists(String),

    /// No entry is recorded under this name.
    #[error("entry with name '{0}' not found")]
    EntryNotFound(String),

    /// A source (or move target) is not located under the store root.
    #[error("source {} is outside of root {}", path.display(), root.display())]
    OutsideRoot {
        /// Normalized store root.
        root: PathBuf,
        /// Offending path.
        path: PathBuf,
    },

    /// The move target is already occupied.
    #[error("source path {} already exists", .0.display())]
    SourceAlreadyExists(PathBuf),

    /// A regular file or directory occupies the destination.
    #[error("conflicting item at {}", .0.display())]
    ConflictingItem(PathBuf),

    /// A symlink at the destination points somewhere other than the source.
    #[error("conflicting symlink at {} (points to {})", destination.display(), target.display())]
    ConflictingLink {
        /// Destination that holds the foreign symlink.
        destination: PathBuf,
        /// Where the foreign symlink points.
        target: PathBuf,
    },

    /// The declared source is absent from disk.
    #[error("source {} is missing", .0.display())]
    SourceMissing(PathBuf),

    /// A required field was empty.
    #[error("{0} is empty")]
    EmptyField(&'static str),

    /// A caller violated a documented precondition (e.g. relative path).
    #[error("invalid precondition: {0}")]
    InvalidPrecondition(String),

    /// The home directory could not be determined.
    #[error("home directory could not be determined (HOME is not set)")]
    HomeDirUnavailable,

    /// A profile name is already registered with a different root.
    #[error("profile '{0}' already exists")]
    ProfileAlreadyExists(String),

    /// No profile is registered under this name.
    #[error("profile '{0}' not found")]
    ProfileNotFound(String),

    /// The entry was moved on disk and in the store, but re-linking failed.
    #[error("moved entry '{name}' but could not relink {}: {source}", destination.display())]
    RelinkFailed {
        /// Entry that was moved.
        name: String,
        /// Destination whose symlink could not be recreated.
        destination: PathBuf,
        /// Why re-linking failed.
        source: Box<StoreError>,
    },

    /// An unexpected filesystem error.
    #[error("{context} {}: {source}", path.display())]
    Io {
        /// What was being done, e.g. `"reading stat"`.
        context: &'static str,
        /// Path the operation touched.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// A JSON document could not be decoded.
    #[error("decoding {}: {source}", path.display())]
    Decode {
        /// File being decoded.
        path: PathBuf,
        /// Underlying serde error.
        source: serde_json::Error,
    },

    /// A JSON document could not be encoded.
    #[error("encoding {}: {source}", path.display())]
    Encode {
        /// File being encoded.
        path: PathBuf,
        /// Underlying serde error.
        source: serde_json::Error,
    },
}

impl StoreError {
    /// Build an [`StoreError::Io`] for `path`.
    pub fn io(context: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            context,
            path: path.into(),
            source,
        }
    }

    /// Classify this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::PathNotFound(_)
            | Self::StoreNotFound(_)
            | Self::EntryNotFound(_)
            | Self::ProfileNotFound(_) => ErrorKind::NotFound,
            Self::StoreAlreadyExists(_)
            | Self::EntryAlreadyExists(_)
            | Self::ProfileAlreadyExists(_)
            | Self::SourceAlreadyExists(_) => ErrorKind::AlreadyExists,
            Self::NotADirectory(_) => ErrorKind::NotADirectory,
            Self::OutsideRoot { .. } => ErrorKind::OutsideRoot,
            Self::ConflictingItem(_) => ErrorKind::ConflictingItem,
            Self::ConflictingLink { .. } => ErrorKind::ConflictingLink,
            Self::SourceMissing(_) => ErrorKind::SourceMissing,
            Self::EmptyField(_) | Self::InvalidPrecondition(_) | Self::HomeDirUnavailable => {
                ErrorKind::InvalidInput
            }
            Self::RelinkFailed { .. } => ErrorKind::PartialFailure,
            Self::Io { .. } | Self::Decode { .. } | Self::Encode { .. } => ErrorKind::IoFailure,
        }
    }
}
