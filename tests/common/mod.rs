// Shared helpers for integration tests.
//
// Provides a temporary directory holding a store root and a fake home
// directory, plus a fluent builder for populating the root before a test
// runs.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use sto_cli::config::{Config, Env};
use sto_cli::paths::HomeDir;
use sto_cli::store::Store;

/// An isolated root and home backed by a [`tempfile::TempDir`].
pub struct IntegrationTestContext {
    /// Temporary directory containing `root/` and `home/`.
    pub dir: tempfile::TempDir,
    /// Canonical path of `home/`.
    pub home: PathBuf,
    /// Canonical path of `home/dotfiles/`, the store root.
    pub root: PathBuf,
}

impl IntegrationTestContext {
    /// Create the directories without initializing a store.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let home = dir.path().join("home");
        std::fs::create_dir_all(home.join("dotfiles")).expect("create root dir");
        let home = dunce::canonicalize(&home).expect("canonicalize home");
        let root = home.join("dotfiles");
        Self { dir, home, root }
    }

    /// Home directory handle for store calls.
    pub fn home_dir(&self) -> HomeDir {
        HomeDir::new(&self.home)
    }

    /// Path under the home directory.
    pub fn home_path(&self, rel: &str) -> PathBuf {
        self.home.join(rel)
    }

    /// Path under the root.
    pub fn root_path(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    /// Create the store in the root.
    pub fn init_store(&self) -> Store {
        Store::initialize(&self.root, self.home_dir()).expect("initialize store")
    }

    /// Load the store from disk.
    pub fn open_store(&self) -> Store {
        Store::open(&self.root, self.home_dir()).expect("open store")
    }

    /// Raw contents of the store file.
    pub fn store_file(&self) -> String {
        std::fs::read_to_string(self.root.join(".sto")).expect("read store file")
    }

    /// Configuration with `HOME` pointing at the fake home and no overrides.
    pub fn config(&self) -> Config {
        let env = Env {
            home: Some(self.home.clone()),
            ..Env::default()
        };
        Config::load(&env, None, None).expect("load config")
    }
}

/// Write `content` to `path`, creating parent directories.
pub fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent dir");
    }
    std::fs::write(path, content).expect("write file");
}

/// Fluent builder for [`IntegrationTestContext`].
pub struct TestContextBuilder {
    ctx: IntegrationTestContext,
}

impl TestContextBuilder {
    /// Begin building a new context.
    pub fn new() -> Self {
        Self {
            ctx: IntegrationTestContext::new(),
        }
    }

    /// Create a file inside the root.
    pub fn with_source(self, rel: &str, content: &str) -> Self {
        write_file(&self.ctx.root.join(rel), content);
        self
    }

    /// Create a file inside the home directory.
    pub fn with_home_file(self, rel: &str, content: &str) -> Self {
        write_file(&self.ctx.home.join(rel), content);
        self
    }

    /// Finish building and return the configured context.
    pub fn build(self) -> IntegrationTestContext {
        self.ctx
    }
}
