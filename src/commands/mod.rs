//! Subcommand handlers.
//!
//! Each handler takes the resolved [`Config`] and the [`Logger`].  Handlers
//! that act on several entries record one outcome per entry and finish with
//! [`finish`], so a single failing entry does not stop the others.
pub mod add;
pub mod delete;
pub mod init;
pub mod list;
pub mod move_entry;
pub mod profiles;
pub mod prompt;
pub mod pull;
pub mod push;
pub mod rename;
pub mod switch;
pub mod unlink;

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use crate::config::Config;
use crate::logging::Logger;
use crate::store::Store;

/// The active store, opened once per command.
#[derive(Debug)]
pub struct CommandSetup {
    /// Store for the resolved root.
    pub store: Store,
}

impl CommandSetup {
    /// Resolve the active root and open its store.
    ///
    /// # Errors
    ///
    /// Returns an error if no root is active or the store cannot be loaded.
    pub fn init(config: &Config, log: &Logger) -> Result<Self> {
        let root = config.resolve_root()?;
        log.debug(&format!("root: {}", root.display()));

        let store = Store::open(&root, config.home.clone())
            .with_context(|| format!("opening store in {}", root.display()))?;
        log.debug(&format!("{} entries", store.len()));
        Ok(Self { store })
    }
}

/// Print the summary and bail if any entry failed.
///
/// # Errors
///
/// Returns an error if one or more entries recorded a failure.
pub fn finish(log: &Logger) -> Result<()> {
    log.print_summary();

    let count = log.failure_count();
    if count > 0 {
        anyhow::bail!("{count} of {} entries failed", log.entries().len());
    }
    Ok(())
}

/// Make a command-line path absolute against the working directory without
/// resolving symlinks.
///
/// # Errors
///
/// Returns an error if the working directory cannot be determined.
pub fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).with_context(|| format!("resolving {}", path.display()))
}
