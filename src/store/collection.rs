//! Registry of named profiles, each pointing at a store root.
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::Store;
use super::file::JsonFile;
use crate::error::{Result, StoreError};
use crate::link;
use crate::paths::{self, HomeDir};

/// One registry record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Profile {
    /// Profile name.
    pub name: String,
    /// Normalized store root.
    pub root: PathBuf,
}

/// Profiles persisted as a JSON array of `{Name, Root}`.
#[derive(Debug)]
pub struct StoreCollection {
    file: JsonFile,
    profiles: BTreeMap<String, PathBuf>,
}

impl StoreCollection {
    /// Load the registry at `path`, creating an empty one if it is missing.
    ///
    /// # Errors
    ///
    /// Returns an I/O or decode error if the file cannot be created or read.
    pub fn load(path: &Path) -> Result<Self> {
        let file = JsonFile::create(path)?;
        let profiles = file
            .read::<Vec<Profile>>()?
            .into_iter()
            .map(|profile| (profile.name, profile.root))
            .collect();
        Ok(Self { file, profiles })
    }

    /// All profiles, sorted by name.
    #[must_use]
    pub fn profiles(&self) -> Vec<Profile> {
        self.profiles
            .iter()
            .map(|(name, root)| Profile {
                name: name.clone(),
                root: root.clone(),
            })
            .collect()
    }

    /// Root registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ProfileNotFound`] if there is no such profile.
    pub fn root(&self, name: &str) -> Result<&Path> {
        self.profiles
            .get(name)
            .map(PathBuf::as_path)
            .ok_or_else(|| StoreError::ProfileNotFound(name.to_string()))
    }

    /// Name of the profile registered for `root`, if any.
    #[must_use]
    pub fn name_for(&self, root: &Path) -> Option<&str> {
        let root = paths::normalize_dir(root);
        self.profiles
            .iter()
            .find(|(_, registered)| **registered == root)
            .map(|(name, _)| name.as_str())
    }

    /// Register `root` under `name` (defaulting to the root's last component)
    /// and return the name used.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::StoreNotFound`] if `root` holds no store file,
    /// [`StoreError::ProfileAlreadyExists`] if `name` points at another root,
    /// or a persist error.
    pub fn add(&mut self, name: &str, root: &Path) -> Result<String> {
        let name = if name.is_empty() {
            root.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .ok_or(StoreError::EmptyField("profile name"))?
        } else {
            name.to_string()
        };

        if !link::fs::occupied(&super::store_file_path(root))? {
            return Err(StoreError::StoreNotFound(root.to_path_buf()));
        }
        let root = paths::normalize_dir(root);

        if let Some(existing) = self.profiles.get(&name) {
            if *existing == root {
                return Ok(name);
            }
            return Err(StoreError::ProfileAlreadyExists(name));
        }

        self.profiles.insert(name.clone(), root);
        if let Err(e) = self.persist() {
            self.profiles.remove(&name);
            return Err(e);
        }
        tracing::debug!("registered profile '{name}'");
        Ok(name)
    }

    /// Forget the profile called `name`.  The store itself is untouched.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ProfileNotFound`] or a persist error.
    pub fn remove(&mut self, name: &str) -> Result<PathBuf> {
        let root = self
            .profiles
            .remove(name)
            .ok_or_else(|| StoreError::ProfileNotFound(name.to_string()))?;
        if let Err(e) = self.persist() {
            self.profiles.insert(name.to_string(), root);
            return Err(e);
        }
        Ok(root)
    }

    /// Open the store registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ProfileNotFound`] or any [`Store::open`] error.
    pub fn open(&self, name: &str, home: HomeDir) -> Result<Store> {
        Store::open(self.root(name)?, home)
    }

    /// Rewrite the registry file.
    ///
    /// # Errors
    ///
    /// Returns an encode or I/O error.
    pub fn persist(&self) -> Result<()> {
        self.file.write(&self.profiles())
    }
}
