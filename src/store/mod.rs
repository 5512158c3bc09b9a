//! The authoritative set of entries for one root directory.
//!
//! A [`Store`] is loaded from the `.sto` file in its root, mutated through the
//! operations below, and rewritten in full after every successful mutation.
//! Operations that touch both the filesystem and the store file undo their
//! filesystem side effects when persisting fails, so a failed call leaves
//! either everything or nothing committed.  [`Store::move_entry`] is the one
//! exception: once the source has been renamed on disk the new location is
//! kept and a failed re-link is reported as [`StoreError::RelinkFailed`].
//!
//! Entries are held in their portable form (root-relative source,
//! `~`-compressed destination) and resolved to absolute paths on the way out.
pub mod collection;
pub mod entry;
pub mod file;

use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;

pub use entry::Entry;

use crate::error::{Result, StoreError};
use crate::link::{self, ConflictDecision, ConflictResolver, LinkChange, LinkState, NeverOverwrite};
use crate::paths::{self, HomeDir};
use file::JsonFile;

/// Name of the store file kept in every root.
pub const STORE_FILE_NAME: &str = ".sto";

/// Location of the store file for `root`.
#[must_use]
pub fn store_file_path(root: &Path) -> PathBuf {
    root.join(STORE_FILE_NAME)
}

/// Outcome of [`Store::add`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// The entry was recorded and its link reconciled.
    Added(LinkChange),
    /// An identical entry was already recorded; nothing changed.
    AlreadyTracked,
}

/// On-disk shapes accepted when opening a store.  Anything else is a
/// decode error, so an unrecognized file is never rewritten as empty.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoreDocument {
    Entries(Vec<Entry>),
    Legacy(LegacyDocument),
    Map(BTreeMap<String, Entry>),
}

/// `{"Entries": {name: entry}}`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LegacyDocument {
    #[serde(rename = "Entries", default)]
    entries: Option<BTreeMap<String, Entry>>,
}

impl Default for StoreDocument {
    fn default() -> Self {
        Self::Entries(Vec::new())
    }
}

impl StoreDocument {
    fn into_entries(self, path: &Path) -> BTreeMap<String, Entry> {
        let entries: Vec<(String, Entry)> = match self {
            Self::Entries(list) => list
                .into_iter()
                .map(|entry| (entry.name.clone(), entry))
                .collect(),
            Self::Legacy(LegacyDocument { entries }) => {
                warn_legacy(path);
                entries.unwrap_or_default().into_iter().collect()
            }
            Self::Map(entries) => {
                warn_legacy(path);
                entries.into_iter().collect()
            }
        };

        entries
            .into_iter()
            .map(|(key, mut entry)| {
                if entry.name.is_empty() {
                    entry.name = if key.is_empty() {
                        paths::portable(&entry.source)
                    } else {
                        key
                    };
                }
                (entry.name.clone(), entry)
            })
            .collect()
    }
}

fn warn_legacy(path: &Path) {
    tracing::warn!(
        "store file {} uses the legacy map layout; it will be rewritten as a list on the next change",
        path.display()
    );
}

/// Entries tracked for one root.
#[derive(Debug)]
pub struct Store {
    root: PathBuf,
    home: HomeDir,
    file: JsonFile,
    entries: BTreeMap<String, Entry>,
}

impl Store {
    /// Create a new, empty store file in `root`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::PathNotFound`] if `root` does not exist,
    /// [`StoreError::NotADirectory`] if it is not a directory and
    /// [`StoreError::StoreAlreadyExists`] if it already holds a store file.
    pub fn initialize(root: &Path, home: HomeDir) -> Result<Self> {
        require_absolute(root)?;
        let meta = std::fs::metadata(root).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                StoreError::PathNotFound(root.to_path_buf())
            } else {
                StoreError::io("reading stat", root, e)
            }
        })?;
        if !meta.is_dir() {
            return Err(StoreError::NotADirectory(root.to_path_buf()));
        }

        let path = store_file_path(root);
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| {
                if e.kind() == io::ErrorKind::AlreadyExists {
                    StoreError::StoreAlreadyExists(root.to_path_buf())
                } else {
                    StoreError::io("creating store file", &path, e)
                }
            })?;

        tracing::debug!("initialized store at {}", path.display());
        Ok(Self {
            root: paths::normalize_dir(root),
            home,
            file: JsonFile::new(path),
            entries: BTreeMap::new(),
        })
    }

    /// Load the store file in `root`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::StoreNotFound`] if there is no store file, or a
    /// read/decode error if it cannot be loaded.
    pub fn open(root: &Path, home: HomeDir) -> Result<Self> {
        require_absolute(root)?;
        let path = store_file_path(root);
        if !link::fs::occupied(&path)? {
            return Err(StoreError::StoreNotFound(root.to_path_buf()));
        }

        let file = JsonFile::new(path);
        let entries = file.read::<StoreDocument>()?.into_entries(file.path());
        tracing::debug!("opened store {} ({} entries)", file.path().display(), entries.len());
        Ok(Self {
            root: paths::normalize_dir(root),
            home,
            file,
            entries,
        })
    }

    /// Normalized root, ending in a separator.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Home directory used to compress and expand destinations.
    #[must_use]
    pub const fn home(&self) -> &HomeDir {
        &self.home
    }

    /// Path of the backing store file.
    #[must_use]
    pub fn file_path(&self) -> &Path {
        self.file.path()
    }

    /// Number of tracked entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store tracks no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries with absolute paths, sorted by name.
    #[must_use]
    pub fn list(&self) -> Vec<Entry> {
        self.entries
            .values()
            .map(|entry| entry.resolve(&self.root, &self.home))
            .collect()
    }

    /// The entry called `name`, with absolute paths.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::EntryNotFound`] if there is no such entry.
    pub fn get(&self, name: &str) -> Result<Entry> {
        self.portable(name)
            .map(|entry| entry.resolve(&self.root, &self.home))
    }

    /// Record `entry` and link it, refusing to touch conflicting items.
    ///
    /// # Errors
    ///
    /// See [`add_with`](Self::add_with).
    pub fn add(&mut self, entry: &Entry) -> Result<AddOutcome> {
        self.add_with(entry, &mut NeverOverwrite)
    }

    /// Record `entry` and link it, asking `resolver` before deleting an item
    /// that occupies the destination.
    ///
    /// Re-adding an identical entry is a no-op.  If linking or persisting
    /// fails nothing is recorded and a link created by this call is removed.
    ///
    /// # Errors
    ///
    /// Returns validation errors ([`StoreError::EmptyField`],
    /// [`StoreError::OutsideRoot`], [`StoreError::InvalidPrecondition`]),
    /// [`StoreError::EntryAlreadyExists`] for a different entry under the same
    /// name, any link error, or a persist error.
    pub fn add_with(
        &mut self,
        entry: &Entry,
        resolver: &mut dyn ConflictResolver,
    ) -> Result<AddOutcome> {
        let portable = entry.to_portable(&self.root, &self.home)?;
        if let Some(existing) = self.entries.get(&portable.name) {
            if *existing == portable {
                tracing::debug!("entry '{}' already tracked", portable.name);
                return Ok(AddOutcome::AlreadyTracked);
            }
            return Err(StoreError::EntryAlreadyExists(portable.name));
        }

        let link = portable.resolve(&self.root, &self.home).link();
        let change = reconcile(&link, resolver)?;

        let name = portable.name.clone();
        self.entries.insert(name.clone(), portable);
        if let Err(e) = self.persist() {
            self.entries.remove(&name);
            if change != LinkChange::AlreadyCorrect
                && let Err(undo) = link.unapply()
            {
                tracing::warn!("could not remove link {}: {undo}", link.description());
            }
            return Err(e);
        }

        tracing::debug!("added entry '{name}': {}", link.description());
        Ok(AddOutcome::Added(change))
    }

    /// Unlink (if linked) and forget the entry called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::EntryNotFound`], an unlink error (the entry is
    /// kept), or a persist error (the entry and its link are restored).
    pub fn remove(&mut self, name: &str) -> Result<Entry> {
        let resolved = self.get(name)?;
        let link = resolved.link();
        let change = link.unapply()?;

        let Some(portable) = self.entries.remove(name) else {
            return Err(StoreError::EntryNotFound(name.to_string()));
        };
        if let Err(e) = self.persist() {
            self.entries.insert(name.to_string(), portable);
            if change == LinkChange::Removed
                && let Err(undo) = link.apply()
            {
                tracing::warn!("could not restore link {}: {undo}", link.description());
            }
            return Err(e);
        }

        tracing::debug!("removed entry '{name}'");
        Ok(resolved)
    }

    /// Create the symlink for `name`, refusing to touch conflicting items.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::EntryNotFound`] or any link error.
    pub fn apply(&self, name: &str) -> Result<LinkChange> {
        self.apply_with(name, &mut NeverOverwrite)
    }

    /// Create the symlink for `name`, asking `resolver` before deleting an
    /// item that occupies the destination.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::EntryNotFound`] or any link error.
    pub fn apply_with(&self, name: &str, resolver: &mut dyn ConflictResolver) -> Result<LinkChange> {
        let link = self.get(name)?.link();
        let change = reconcile(&link, resolver)?;
        tracing::debug!("apply '{name}': {change:?}");
        Ok(change)
    }

    /// Remove the symlink for `name` if it points at the entry's source.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::EntryNotFound`] or an I/O error.
    pub fn unapply(&self, name: &str) -> Result<LinkChange> {
        let change = self.get(name)?.link().unapply()?;
        tracing::debug!("unapply '{name}': {change:?}");
        Ok(change)
    }

    /// Raw link classification for `name`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::EntryNotFound`] or an I/O error.
    pub fn state(&self, name: &str) -> Result<LinkState> {
        self.get(name)?.link().classify()
    }

    /// Whether `name` is linked.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::EntryNotFound`], an I/O error, or the typed error
    /// for a missing source or a conflicting destination.
    pub fn check_state(&self, name: &str) -> Result<bool> {
        let link = self.get(name)?.link();
        link.classify()?.check(&link)
    }

    /// Change the key of an entry.  Paths and link state are untouched.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::EmptyField`], [`StoreError::EntryNotFound`],
    /// [`StoreError::EntryAlreadyExists`] or a persist error.
    pub fn rename(&mut self, old: &str, new: &str) -> Result<()> {
        if new.is_empty() {
            return Err(StoreError::EmptyField("new name"));
        }
        if !self.entries.contains_key(old) {
            return Err(StoreError::EntryNotFound(old.to_string()));
        }
        if old == new {
            return Ok(());
        }
        if self.entries.contains_key(new) {
            return Err(StoreError::EntryAlreadyExists(new.to_string()));
        }

        let Some(mut entry) = self.entries.remove(old) else {
            return Err(StoreError::EntryNotFound(old.to_string()));
        };
        entry.name = new.to_string();
        self.entries.insert(new.to_string(), entry);

        if let Err(e) = self.persist() {
            if let Some(mut entry) = self.entries.remove(new) {
                entry.name = old.to_string();
                self.entries.insert(old.to_string(), entry);
            }
            return Err(e);
        }
        tracing::debug!("renamed entry '{old}' to '{new}'");
        Ok(())
    }

    /// Relocate the source of `name` to `new_path` inside the root, keeping
    /// the destination.  A linked entry is unlinked first and re-linked to
    /// the new source afterwards.
    ///
    /// # Errors
    ///
    /// Validation errors ([`StoreError::EntryNotFound`],
    /// [`StoreError::OutsideRoot`], [`StoreError::SourceAlreadyExists`],
    /// [`StoreError::SourceMissing`]) leave everything untouched.  A failed
    /// rename restores the old link.  After the rename the entry is updated
    /// regardless; a failed re-link is [`StoreError::RelinkFailed`].
    pub fn move_entry(&mut self, name: &str, new_path: &Path) -> Result<Entry> {
        self.relocate(name, new_path, link::Link::apply)
    }

    fn relocate(
        &mut self,
        name: &str,
        new_path: &Path,
        relink: impl FnOnce(&link::Link) -> Result<LinkChange>,
    ) -> Result<Entry> {
        let resolved = self.get(name)?;
        let rel = paths::trim_root(new_path, &self.root)?;
        let new_source = self.root.join(&rel);
        if link::fs::occupied(&new_source)? {
            return Err(StoreError::SourceAlreadyExists(new_source));
        }

        let old_link = resolved.link();
        let was_linked = match old_link.classify()? {
            LinkState::SourceMissing => return Err(StoreError::SourceMissing(resolved.source)),
            state => state == LinkState::Linked,
        };

        if was_linked {
            old_link.unapply()?;
        }
        if let Err(e) = link::fs::rename(&resolved.source, &new_source) {
            if was_linked && let Err(undo) = old_link.apply() {
                tracing::warn!("could not restore link {}: {undo}", old_link.description());
            }
            return Err(e);
        }

        if let Some(entry) = self.entries.get_mut(name) {
            entry.source = PathBuf::from(paths::portable(&rel));
        }
        let moved = self.get(name)?;

        let relinked = if was_linked {
            relink(&moved.link()).map(|_| ())
        } else {
            Ok(())
        };

        if let Err(e) = self.persist() {
            tracing::warn!(
                "moved {} to {} but could not record the new location",
                resolved.source.display(),
                new_source.display()
            );
            return Err(e);
        }

        relinked.map_err(|source| StoreError::RelinkFailed {
            name: name.to_string(),
            destination: moved.destination.clone(),
            source: Box::new(source),
        })?;

        tracing::debug!("moved entry '{name}' to {}", new_source.display());
        Ok(moved)
    }

    /// Move an existing item from outside the root into `root/<name>`, then
    /// track it with a symlink at its original location.
    ///
    /// `name` defaults to the item's file name.  If recording the entry
    /// fails the item is moved back.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidPrecondition`] for a relative target, one
    /// inside the root or one containing it, [`StoreError::OutsideRoot`] for a
    /// name that would land outside the root, [`StoreError::PathNotFound`] if
    /// the target does not exist,
    /// [`StoreError::EntryAlreadyExists`] or
    /// [`StoreError::SourceAlreadyExists`] on collisions, and any rename,
    /// link or persist error.
    pub fn adopt(&mut self, target: &Path, name: Option<&str>) -> Result<Entry> {
        require_absolute(target)?;
        if !link::fs::occupied(target)? {
            return Err(StoreError::PathNotFound(target.to_path_buf()));
        }
        if target.starts_with(&self.root) {
            return Err(StoreError::InvalidPrecondition(format!(
                "{} is already inside root {}",
                target.display(),
                self.root.display()
            )));
        }
        if self.root.starts_with(target) {
            return Err(StoreError::InvalidPrecondition(format!(
                "{} contains root {}",
                target.display(),
                self.root.display()
            )));
        }

        let name = match name {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => target
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .ok_or(StoreError::EmptyField("name"))?,
        };
        if self.entries.contains_key(&name) {
            return Err(StoreError::EntryAlreadyExists(name));
        }
        let source = self.root.join(paths::trim_root(&self.root.join(&name), &self.root)?);
        if link::fs::occupied(&source)? {
            return Err(StoreError::SourceAlreadyExists(source));
        }

        link::fs::rename(target, &source)?;
        let entry = Entry::new(name, source.clone(), target.to_path_buf());
        if let Err(e) = self.add(&entry) {
            if let Err(undo) = link::fs::rename(&source, target) {
                tracing::warn!("could not move {} back: {undo}", source.display());
            }
            return Err(e);
        }

        tracing::debug!("adopted {} as '{}'", target.display(), entry.name);
        self.get(&entry.name)
    }

    /// Rewrite the store file with the current entries.
    ///
    /// # Errors
    ///
    /// Returns an encode or I/O error; the previous file is left intact.
    pub fn persist(&self) -> Result<()> {
        let entries: Vec<&Entry> = self.entries.values().collect();
        self.file.write(&entries)
    }

    fn portable(&self, name: &str) -> Result<&Entry> {
        self.entries
            .get(name)
            .ok_or_else(|| StoreError::EntryNotFound(name.to_string()))
    }
}

/// Apply `link`, letting `resolver` decide whether a conflicting item may be
/// deleted.
fn reconcile(link: &link::Link, resolver: &mut dyn ConflictResolver) -> Result<LinkChange> {
    match link.classify()? {
        LinkState::ConflictingItem => match resolver.on_conflict(&link.destination) {
            ConflictDecision::Overwrite => link.overwrite(),
            ConflictDecision::Skip => Err(StoreError::ConflictingItem(link.destination.clone())),
        },
        _ => link.apply(),
    }
}

fn require_absolute(path: &Path) -> Result<()> {
    if path.is_absolute() {
        Ok(())
    } else {
        Err(StoreError::InvalidPrecondition(format!(
            "path {} is not absolute",
            path.display()
        )))
    }
}
