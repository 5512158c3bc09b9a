//! Home-directory compression and root-prefix helpers.
//!
//! Destinations are persisted with the home directory folded to `~` so a store
//! can move between machines; sources are persisted relative to the store
//! root.  These helpers convert between the persisted and the operational
//! (absolute) forms.  All comparisons are component-wise, so `/home/user2`
//! is never treated as living under `/home/user`.
use std::path::{Component, Path, PathBuf};

use crate::error::{Result, StoreError};

const TILDE: &str = "~";

/// The current user's home directory, read once at start-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomeDir(PathBuf);

impl HomeDir {
    /// Wrap an explicit home directory.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// The absolute home directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.0
    }

    /// Replace a leading home directory with `~`.
    ///
    /// Paths outside the home directory (and the empty path) are returned
    /// unchanged.
    #[must_use]
    pub fn compress(&self, path: &Path) -> PathBuf {
        match path.strip_prefix(&self.0) {
            Ok(rest) if rest.as_os_str().is_empty() => PathBuf::from(TILDE),
            Ok(rest) => Path::new(TILDE).join(rest),
            Err(_) => path.to_path_buf(),
        }
    }

    /// Replace a leading `~` (alone or followed by a separator) with the home
    /// directory.
    ///
    /// `~user/...`, the empty path and every other path are returned unchanged.
    #[must_use]
    pub fn expand(&self, path: &Path) -> PathBuf {
        match path.strip_prefix(TILDE) {
            Ok(rest) if rest.as_os_str().is_empty() => self.0.clone(),
            Ok(rest) => self.0.join(rest),
            Err(_) => path.to_path_buf(),
        }
    }
}

/// Normalize a directory path so that it ends in exactly one separator.
///
/// Redundant separators and interior `.` components are dropped.
#[must_use]
pub fn normalize_dir(path: &Path) -> PathBuf {
    path.components().collect::<PathBuf>().join("")
}

/// Strip `root` from the absolute `path`, returning the root-relative rest.
///
/// # Errors
///
/// Returns [`StoreError::InvalidPrecondition`] if `path` is not absolute, and
/// [`StoreError::OutsideRoot`] if `path` is the root itself, is not under it,
/// or escapes it through `..`.
pub fn trim_root(path: &Path, root: &Path) -> Result<PathBuf> {
    if !path.is_absolute() {
        return Err(StoreError::InvalidPrecondition(format!(
            "path {} is not absolute",
            path.display()
        )));
    }

    let outside = || StoreError::OutsideRoot {
        root: root.to_path_buf(),
        path: path.to_path_buf(),
    };

    let rel = path.strip_prefix(root).map_err(|_| outside())?;
    if rel.as_os_str().is_empty() || rel.components().any(|c| !matches!(c, Component::Normal(_))) {
        return Err(outside());
    }
    Ok(rel.to_path_buf())
}

/// Resolve `.` and `..` components lexically, without touching the
/// filesystem.  `..` at the root stays at the root.
#[must_use]
pub fn clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Render a relative path with `/` separators, the form used on disk.
#[must_use]
pub fn portable(rel: &Path) -> String {
    rel.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn home() -> HomeDir {
        HomeDir::new("/home/tester")
    }

    #[test]
    fn compress_replaces_home_prefix() {
        let path = Path::new("/home/tester/testpath");
        assert_eq!(home().compress(path), PathBuf::from("~/testpath"));
    }

    #[test]
    fn compress_home_itself_is_tilde() {
        assert_eq!(home().compress(Path::new("/home/tester")), PathBuf::from("~"));
    }

    #[test]
    fn compress_leaves_outside_paths_alone() {
        let path = Path::new("/test-dir/test-file");
        assert_eq!(home().compress(path), path);
    }

    #[test]
    fn compress_does_not_match_sibling_with_common_prefix() {
        let path = Path::new("/home/tester2/file");
        assert_eq!(home().compress(path), path);
    }

    #[test]
    fn compress_empty_is_empty() {
        assert_eq!(home().compress(Path::new("")), PathBuf::new());
    }

    #[test]
    fn expand_replaces_tilde() {
        let path = Path::new("~/testpath");
        assert_eq!(home().expand(path), PathBuf::from("/home/tester/testpath"));
    }

    #[test]
    fn expand_single_tilde_does_not_panic() {
        assert_eq!(home().expand(Path::new("~")), PathBuf::from("/home/tester"));
    }

    #[test]
    fn expand_leaves_other_paths_alone() {
        for raw in ["", "/etc/hosts", "relative/~", "~other/file"] {
            let path = Path::new(raw);
            assert_eq!(home().expand(path), path, "{raw:?} should be unchanged");
        }
    }

    #[test]
    fn expand_inverts_compress_under_home() {
        let home = home();
        for raw in ["/home/tester/.bashrc", "/home/tester/.config/nvim/init.lua"] {
            let path = Path::new(raw);
            assert_eq!(home.expand(&home.compress(path)), path);
        }
    }

    #[test]
    fn normalize_dir_adds_single_trailing_separator() {
        assert_eq!(
            normalize_dir(Path::new("/tmp/root")).as_os_str(),
            "/tmp/root/"
        );
        assert_eq!(
            normalize_dir(Path::new("/tmp/root//")).as_os_str(),
            "/tmp/root/"
        );
    }

    #[test]
    fn clean_resolves_dot_components() {
        assert_eq!(
            clean(Path::new("/home/tester/dotfiles/../.vimrc")),
            PathBuf::from("/home/tester/.vimrc")
        );
        assert_eq!(clean(Path::new("/a/./b/")), PathBuf::from("/a/b"));
        assert_eq!(clean(Path::new("/..")), PathBuf::from("/"));
    }

    #[test]
    fn trim_root_returns_relative_rest() {
        let rel = trim_root(Path::new("/tmp/root/a/b"), Path::new("/tmp/root/")).unwrap();
        assert_eq!(rel, PathBuf::from("a/b"));
    }

    #[test]
    fn trim_root_rejects_relative_input() {
        let err = trim_root(Path::new("a/b"), Path::new("/tmp/root/")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn trim_root_rejects_paths_outside_root() {
        for raw in ["/tmp/other/a", "/tmp/rootless/a", "/tmp/root", "/tmp/root/../etc"] {
            let err = trim_root(Path::new(raw), Path::new("/tmp/root/")).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::OutsideRoot, "{raw}");
        }
    }

    #[test]
    fn portable_joins_with_forward_slashes() {
        assert_eq!(portable(Path::new("config/nvim/init.lua")), "config/nvim/init.lua");
        assert_eq!(portable(Path::new("./a//b")), "a/b");
    }
}
