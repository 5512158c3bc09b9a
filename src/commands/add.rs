//! Command: track an item that already lives in the root.
use anyhow::{Context as _, Result};

use super::prompt::Prompt;
use super::{CommandSetup, absolute};
use crate::cli::AddOpts;
use crate::config::Config;
use crate::link::{AlwaysOverwrite, ConflictResolver, LinkChange};
use crate::logging::Logger;
use crate::store::{AddOutcome, Entry, Store};

/// Run the add command.
///
/// # Errors
///
/// Returns an error if the store cannot be opened or the entry is rejected.
pub fn run(config: &Config, opts: &AddOpts, log: &Logger) -> Result<()> {
    let mut setup = CommandSetup::init(config, log)?;
    let entry = Entry::new(
        opts.name.clone().unwrap_or_default(),
        absolute(&opts.source)?,
        absolute(&config.home.expand(&opts.destination))?,
    );

    if opts.force {
        add_entry(&mut setup.store, &entry, &mut AlwaysOverwrite, log)
    } else {
        add_entry(&mut setup.store, &entry, &mut Prompt::stdio(), log)
    }
}

/// Add `entry` and report what happened to its destination.
///
/// # Errors
///
/// Returns the store error with the entry's paths as context.
pub fn add_entry(
    store: &mut Store,
    entry: &Entry,
    resolver: &mut dyn ConflictResolver,
    log: &Logger,
) -> Result<()> {
    let description = entry.link().description();
    let outcome = store
        .add_with(entry, resolver)
        .with_context(|| format!("adding {description}"))?;

    match outcome {
        AddOutcome::AlreadyTracked => log.info(&format!("already tracked: {description}")),
        AddOutcome::Added(LinkChange::Replaced) => {
            log.info(&format!("added and replaced existing item: {description}"));
        }
        AddOutcome::Added(_) => log.info(&format!("added: {description}")),
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::link::NeverOverwrite;
    use crate::logging::isolated_logger;
    use crate::paths::HomeDir;

    #[test]
    fn add_links_and_persists() {
        let (log, tmp, _guard) = isolated_logger();
        let root = tmp.path().join("root");
        let home = tmp.path().join("home");
        std::fs::create_dir_all(root.join("vim")).unwrap();
        std::fs::create_dir_all(&home).unwrap();
        std::fs::write(root.join("vim/vimrc"), "set nu").unwrap();
        let mut store = Store::initialize(&root, HomeDir::new(&home)).unwrap();

        let entry = Entry::unnamed(root.join("vim/vimrc"), home.join(".vimrc"));
        add_entry(&mut store, &entry, &mut NeverOverwrite, &log).unwrap();
        add_entry(&mut store, &entry, &mut NeverOverwrite, &log).unwrap();

        assert_eq!(store.len(), 1);
        assert!(store.check_state("vim/vimrc").unwrap());
    }

    #[test]
    fn rejected_add_keeps_typed_error() {
        let (log, tmp, _guard) = isolated_logger();
        let root = tmp.path().join("root");
        std::fs::create_dir_all(&root).unwrap();
        let mut store = Store::initialize(&root, HomeDir::new(tmp.path())).unwrap();

        let entry = Entry::unnamed(tmp.path().join("elsewhere"), tmp.path().join(".x"));
        let err = add_entry(&mut store, &entry, &mut NeverOverwrite, &log).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<StoreError>(),
            Some(StoreError::OutsideRoot { .. })
        ));
        assert!(store.is_empty());
    }
}
