//! Command: unlink and forget entries.
use anyhow::Result;

use super::{CommandSetup, finish};
use crate::cli::NamesOpts;
use crate::config::Config;
use crate::logging::{Logger, Outcome};
use crate::store::Store;

/// Run the delete command.  The sources inside the root are kept.
///
/// # Errors
///
/// Returns an error if the store cannot be opened or any entry failed.
pub fn run(config: &Config, opts: &NamesOpts, log: &Logger) -> Result<()> {
    let mut setup = CommandSetup::init(config, log)?;
    log.stage("Deleting entries");
    delete_all(&mut setup.store, &opts.names, log);
    finish(log)
}

/// Remove each named entry from the store.
pub fn delete_all(store: &mut Store, names: &[String], log: &Logger) {
    for name in names {
        match store.remove(name) {
            Ok(entry) => {
                log.info(&format!("\t{name}: deleted ({} kept)", entry.source.display()));
                log.record(name, Outcome::Changed, None);
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
    use crate::logging::isolated_logger;
    use crate::paths::HomeDir;
    use crate::store::Entry;

    #[test]
    fn delete_forgets_entry_and_keeps_source() {
        let (log, tmp, _guard) = isolated_logger();
        let root = tmp.path().join("root");
        let home = tmp.path().join("home");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::create_dir_all(&home).unwrap();
        let mut store = Store::initialize(&root, HomeDir::new(&home)).unwrap();
        std::fs::write(root.join("vimrc"), "set nu").unwrap();
        store
            .add(&Entry::new("vimrc", root.join("vimrc"), home.join(".vimrc")))
            .unwrap();

        delete_all(&mut store, &["vimrc".to_string(), "vimrc".to_string()], &log);

        let entries = log.entries();
        assert_eq!(entries[0].outcome, Outcome::Changed);
        assert_eq!(entries[1].outcome, Outcome::Failed);
        assert!(store.is_empty());
        assert!(root.join("vimrc").is_file());
        assert!(!home.join(".vimrc").exists());
        assert!(Store::open(&root, HomeDir::new(&home)).unwrap().is_empty());
    }
}
