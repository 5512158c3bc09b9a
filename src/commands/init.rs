//! Command: create a store and make it the active profile.
use std::path::Path;

use anyhow::{Context as _, Result};

use crate::cli::InitOpts;
use crate::config::{Config, absolutize};
use crate::logging::Logger;
use crate::store::Store;

/// Run the init command in `--root` or the working directory.
///
/// # Errors
///
/// Returns an error if the store already exists or the profile cannot be
/// registered.
pub fn run(config: &Config, opts: &InitOpts, log: &Logger) -> Result<()> {
    let root = config
        .root_override
        .clone()
        .map_or_else(std::env::current_dir, Ok)
        .context("reading working directory")?;
    let root = absolutize(&root)?;
    let (store, name) = init_at(config, &root, opts.name.as_deref().unwrap_or_default())?;
    log.info(&format!(
        "initialized {} as profile '{name}'",
        store.file_path().display()
    ));
    Ok(())
}

/// Create the store in `root`, register it and make it active.
///
/// # Errors
///
/// Returns the store, registry or pointer error.
pub fn init_at(config: &Config, root: &Path, name: &str) -> Result<(Store, String)> {
    let store = Store::initialize(root, config.home.clone())?;
    let name = config
        .registry()?
        .add(name, root)
        .with_context(|| format!("registering {}", root.display()))?;
    config.set_current_root(store.root())?;
    Ok((store, name))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::Env;
    use crate::error::StoreError;

    #[test]
    fn init_registers_and_activates() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("dotfiles");
        std::fs::create_dir(&root).unwrap();
        let env = Env {
            home: Some(tmp.path().to_path_buf()),
            ..Env::default()
        };
        let config = Config::load(&env, None, None).unwrap();

        let (store, name) = init_at(&config, &root, "").unwrap();

        assert_eq!(name, "dotfiles");
        assert_eq!(config.resolve_root().unwrap(), store.root());
        assert!(config.registry().unwrap().name_for(&root).is_some());

        let err = init_at(&config, &root, "").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StoreError>(),
            Some(StoreError::StoreAlreadyExists(_))
        ));
    }
}
