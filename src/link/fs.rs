//! Filesystem primitives used by links and moves.
use std::io;
use std::path::Path;

use crate::error::{Result, StoreError};

/// Ensure the parent directory of `path` exists, creating it (and any
/// ancestors) if necessary.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .map_err(|e| StoreError::io("creating directory", parent, e))?;
    }
    Ok(())
}

/// Report whether anything (including a broken symlink) exists at `path`.
///
/// # Errors
///
/// Returns an error for lstat failures other than "not found".
pub fn occupied(path: &Path) -> Result<bool> {
    match std::fs::symlink_metadata(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(StoreError::io("reading stat", path, e)),
    }
}

/// Create a symlink at `link` pointing to `target`.
///
/// # Errors
///
/// Returns an error if the symlink cannot be created.
pub fn create_symlink(target: &Path, link: &Path) -> Result<()> {
    #[cfg(unix)]
    let result = std::os::unix::fs::symlink(target, link);

    #[cfg(windows)]
    let result = if target.is_dir() {
        std::os::windows::fs::symlink_dir(target, link)
    } else {
        std::os::windows::fs::symlink_file(target, link)
    };

    result.map_err(|e| StoreError::io("creating symlink", link, e))
}

/// Remove the symlink at `path`.  A symlink that has already vanished is not
/// an error.
///
/// # Errors
///
/// Returns an error if removal fails for any other reason.
pub fn remove_symlink(path: &Path) -> Result<()> {
    #[cfg(windows)]
    let result = std::fs::remove_file(path).or_else(|_| std::fs::remove_dir(path));

    #[cfg(not(windows))]
    let result = std::fs::remove_file(path);

    match result {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(StoreError::io("removing symlink at", path, e)),
    }
}

/// Remove a regular file or a whole directory tree at `path`.
///
/// # Errors
///
/// Returns an error if the item cannot be inspected or removed.
pub fn remove_item(path: &Path) -> Result<()> {
    let meta =
        std::fs::symlink_metadata(path).map_err(|e| StoreError::io("reading stat", path, e))?;
    let result = if meta.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    };
    result.map_err(|e| StoreError::io("removing", path, e))
}

/// Rename `from` to `to`, creating the parent directory of `to` first.
///
/// # Errors
///
/// Returns an error if the parent cannot be created or the rename fails
/// (including cross-filesystem renames).
pub fn rename(from: &Path, to: &Path) -> Result<()> {
    ensure_parent_dir(to)?;
    std::fs::rename(from, to).map_err(|e| StoreError::io("renaming", from, e))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn ensure_parent_dir_creates_missing_parents() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b").join("file.txt");
        ensure_parent_dir(&nested).unwrap();
        assert!(dir.path().join("a").join("b").is_dir());
    }

    #[test]
    fn occupied_sees_broken_symlinks() {
        let dir = tempfile::tempdir().unwrap();
        let link = dir.path().join("link");
        assert!(!occupied(&link).unwrap());
        create_symlink(&dir.path().join("nonexistent"), &link).unwrap();
        assert!(occupied(&link).unwrap());
    }

    #[test]
    fn remove_symlink_tolerates_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        remove_symlink(&dir.path().join("absent")).unwrap();
    }

    #[test]
    fn remove_symlink_keeps_link_target() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("target");
        let link = dir.path().join("link");
        std::fs::write(&target, "keep me").unwrap();
        create_symlink(&target, &link).unwrap();

        remove_symlink(&link).unwrap();

        assert!(link.symlink_metadata().is_err());
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "keep me");
    }

    #[test]
    fn remove_item_removes_directory_tree() {
        let dir = tempfile::tempdir().unwrap();
        let tree = dir.path().join("tree");
        std::fs::create_dir_all(tree.join("sub")).unwrap();
        std::fs::write(tree.join("sub").join("f"), "x").unwrap();

        remove_item(&tree).unwrap();

        assert!(!tree.exists());
    }

    #[test]
    fn rename_creates_destination_parent() {
        let dir = tempfile::tempdir().unwrap();
        let from = dir.path().join("a");
        let to = dir.path().join("nested").join("b");
        std::fs::write(&from, "content").unwrap();

        rename(&from, &to).unwrap();

        assert!(!from.exists());
        assert_eq!(std::fs::read_to_string(&to).unwrap(), "content");
    }
}
