//! Command: create the symlinks for named entries.
use anyhow::Result;

use super::prompt::Prompt;
use super::{CommandSetup, finish};
use crate::cli::PushOpts;
use crate::config::Config;
use crate::error::StoreError;
use crate::link::{AlwaysOverwrite, ConflictResolver, LinkChange};
use crate::logging::{Logger, Outcome};
use crate::store::Store;

/// Run the push command.
///
/// # Errors
///
/// Returns an error if the store cannot be opened or any entry failed.
pub fn run(config: &Config, opts: &PushOpts, log: &Logger) -> Result<()> {
    let setup = CommandSetup::init(config, log)?;

    log.stage("Linking entries");
    if opts.force {
        link_all(&setup.store, &opts.names, &mut AlwaysOverwrite, log);
    } else {
        link_all(&setup.store, &opts.names, &mut Prompt::stdio(), log);
    }
    finish(log)
}

/// Apply each named entry, recording one outcome per name.
///
/// A conflicting item the resolver chose to keep counts as skipped rather
/// than failed.
pub fn link_all(
    store: &Store,
    names: &[String],
    resolver: &mut dyn ConflictResolver,
    log: &Logger,
) {
    for name in names {
        match store.apply_with(name, resolver) {
            Ok(LinkChange::AlreadyCorrect) => {
                log.info(&format!("\t{name}: Already exists"));
                log.record(name, Outcome::Unchanged, None);
            }
            Ok(change) => {
                let detail = store
                    .get(name)
                    .map(|entry| entry.link().description())
                    .unwrap_or_default();
                log.info(&format!("\t{name}: {detail}"));
                let message = (change == LinkChange::Replaced).then_some("replaced existing item");
                log.record(name, Outcome::Changed, message);
            }
            Err(StoreError::ConflictingItem(path)) => {
                log.warn(&format!("{name}: kept {}", path.display()));
                log.record(name, Outcome::Skipped, Some("conflicting item kept"));
            }
            Err(e) => {
                log.error(&format!("{name}: {e}"));
                log.record(name, Outcome::Failed, Some(&e.to_string()));
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::link::NeverOverwrite;
    use crate::link::conflict::{ConflictDecision, MockConflictResolver};
    use crate::logging::isolated_logger;
    use crate::paths::HomeDir;
    use crate::store::Entry;
    use std::path::PathBuf;

    fn store_with(dir: &std::path::Path, names: &[&str]) -> (Store, PathBuf) {
        let root = dir.join("root");
        let home = dir.join("home");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::create_dir_all(&home).unwrap();
        let mut store = Store::initialize(&root, HomeDir::new(&home)).unwrap();
        for name in names {
            std::fs::write(root.join(name), name).unwrap();
            store
                .add(&Entry::new(*name, root.join(name), home.join(format!(".{name}"))))
                .unwrap();
            store.unapply(name).unwrap();
        }
        (store, home)
    }

    #[test]
    fn links_each_name_and_records_outcomes() {
        let (log, tmp, _guard) = isolated_logger();
        let (store, home) = store_with(tmp.path(), &["vimrc", "bashrc"]);
        store.apply("bashrc").unwrap();

        let names = ["vimrc", "bashrc", "zshrc"].map(String::from);
        link_all(&store, &names, &mut NeverOverwrite, &log);

        let outcomes: Vec<Outcome> = log.entries().into_iter().map(|e| e.outcome).collect();
        assert_eq!(
            outcomes,
            [Outcome::Changed, Outcome::Unchanged, Outcome::Failed]
        );
        assert!(home.join(".vimrc").is_symlink());
    }

    #[test]
    fn declined_conflict_is_skipped() {
        let (log, tmp, _guard) = isolated_logger();
        let (store, home) = store_with(tmp.path(), &["vimrc"]);
        std::fs::write(home.join(".vimrc"), "local").unwrap();

        let mut resolver = MockConflictResolver::new();
        resolver
            .expect_on_conflict()
            .times(1)
            .returning(|_| ConflictDecision::Skip);
        link_all(&store, &["vimrc".to_string()], &mut resolver, &log);

        let entries = log.entries();
        assert_eq!(entries[0].outcome, Outcome::Skipped);
        assert_eq!(std::fs::read_to_string(home.join(".vimrc")).unwrap(), "local");
        assert!(finish(&log).is_ok());
    }

    #[test]
    fn force_replaces_conflicting_item() {
        let (log, tmp, _guard) = isolated_logger();
        let (store, home) = store_with(tmp.path(), &["vimrc"]);
        std::fs::write(home.join(".vimrc"), "local").unwrap();

        link_all(&store, &["vimrc".to_string()], &mut AlwaysOverwrite, &log);

        let entries = log.entries();
        assert_eq!(entries[0].outcome, Outcome::Changed);
        assert_eq!(entries[0].message.as_deref(), Some("replaced existing item"));
        assert_eq!(std::fs::read_to_string(home.join(".vimrc")).unwrap(), "vimrc");
    }
}
