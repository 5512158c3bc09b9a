//! One tracked item: a name, a root-relative source and a destination.
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};
use crate::link::Link;
use crate::paths::{self, HomeDir};

/// A declared mapping from a source inside the root to a destination.
///
/// The same type carries both representations: the *portable* form kept in
/// the store file (source relative to the root with `/` separators,
/// destination with the home directory folded to `~`) and the *resolved* form
/// handed to callers (both paths absolute).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Entry {
    /// Unique key within a store.
    #[serde(default)]
    pub name: String,
    /// Source path.
    #[serde(alias = "SourcePath")]
    pub source: PathBuf,
    /// Destination path.
    #[serde(alias = "DestinationPath")]
    pub destination: PathBuf,
}

impl Entry {
    /// Create an entry with an explicit name.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        source: impl Into<PathBuf>,
        destination: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            destination: destination.into(),
        }
    }

    /// Create an entry whose name defaults to its root-relative source.
    #[must_use]
    pub fn unnamed(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self::new(String::new(), source, destination)
    }

    /// The link described by a *resolved* entry.
    #[must_use]
    pub fn link(&self) -> Link {
        Link::new(self.source.clone(), self.destination.clone())
    }

    /// Validate an operational entry and convert it to the portable form.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::EmptyField`] for an empty source or destination,
    /// [`StoreError::OutsideRoot`] if the source is not under `root`, and
    /// [`StoreError::InvalidPrecondition`] for relative paths or a destination
    /// that overlaps the source or contains the root.
    pub(crate) fn to_portable(&self, root: &Path, home: &HomeDir) -> Result<Self> {
        if self.source.as_os_str().is_empty() {
            return Err(StoreError::EmptyField("source"));
        }
        if self.destination.as_os_str().is_empty() {
            return Err(StoreError::EmptyField("destination"));
        }

        let source = paths::portable(&paths::trim_root(&self.source, root)?);

        let destination = home.expand(&self.destination);
        if !destination.is_absolute() {
            return Err(StoreError::InvalidPrecondition(format!(
                "destination {} is not absolute",
                destination.display()
            )));
        }
        let destination = paths::clean(&destination);

        let absolute_source = root.join(&source);
        if destination.starts_with(&absolute_source) {
            return Err(StoreError::InvalidPrecondition(format!(
                "destination {} is the source or lies inside it",
                destination.display()
            )));
        }
        if root.starts_with(&destination) {
            return Err(StoreError::InvalidPrecondition(format!(
                "destination {} contains the root {}",
                destination.display(),
                root.display()
            )));
        }

        let name = if self.name.is_empty() {
            source.clone()
        } else {
            self.name.clone()
        };

        Ok(Self {
            name,
            source: PathBuf::from(source),
            destination: home.compress(&destination),
        })
    }

    /// Convert a portable entry back to absolute paths.
    #[must_use]
    pub(crate) fn resolve(&self, root: &Path, home: &HomeDir) -> Self {
        Self {
            name: self.name.clone(),
            source: root.join(&self.source),
            destination: home.expand(&self.destination),
        }
    }
}
