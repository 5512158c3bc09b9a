//! Single-file JSON persistence.
//!
//! Reads tolerate an empty file; writes go to a sibling temp file that is
//! renamed over the target so a crash never leaves a half-written document.
use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{Result, StoreError};
use crate::link::fs::ensure_parent_dir;

/// A JSON document at a fixed path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    /// Refer to the document at `path` without touching the filesystem.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Make sure the document and its parent directory exist, leaving any
    /// existing content untouched.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory or file cannot be created.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let file = Self::new(path);
        ensure_parent_dir(&file.path)?;
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&file.path)
            .map_err(|e| StoreError::io("creating", &file.path, e))?;
        Ok(file)
    }

    /// Location of the document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Decode the document, returning `T::default()` for an empty file.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the file cannot be read and
    /// [`StoreError::Decode`] if it is not valid JSON for `T`.
    pub fn read<T: DeserializeOwned + Default>(&self) -> Result<T> {
        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| StoreError::io("reading", &self.path, e))?;
        if content.trim().is_empty() {
            return Ok(T::default());
        }
        serde_json::from_str(&content).map_err(|source| StoreError::Decode {
            path: self.path.clone(),
            source,
        })
    }

    /// Encode `value` as pretty JSON and atomically replace the document.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Encode`] if `value` cannot be serialized and
    /// [`StoreError::Io`] if the temp file cannot be written or renamed.
    pub fn write<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        let mut json = serde_json::to_string_pretty(value).map_err(|source| StoreError::Encode {
            path: self.path.clone(),
            source,
        })?;
        json.push('\n');

        let tmp = self.temp_path();
        let result = write_and_sync(&tmp, json.as_bytes()).and_then(|()| {
            std::fs::rename(&tmp, &self.path).map_err(|e| StoreError::io("replacing", &self.path, e))
        });
        if result.is_err() {
            let _ = std::fs::remove_file(&tmp);
        }
        result
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map_or_else(|| "document".into(), |n| n.to_string_lossy());
        self.path
            .with_file_name(format!(".{name}.{}.tmp", std::process::id()))
    }
}

fn write_and_sync(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = std::fs::File::create(path).map_err(|e| StoreError::io("creating", path, e))?;
    file.write_all(bytes)
        .and_then(|()| file.sync_all())
        .map_err(|e| StoreError::io("writing", path, e))
}
