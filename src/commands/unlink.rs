//! Command: remove symlinks but keep the entries.
use anyhow::Result;

use super::{CommandSetup, finish};
use crate::cli::NamesOpts;
use crate::config::Config;
use crate::link::LinkChange;
use crate::logging::{Logger, Outcome};
use crate::store::Store;

/// Run the unlink command.
///
/// # Errors
///
/// Returns an error if the store cannot be opened or any entry failed.
pub fn run(config: &Config, opts: &NamesOpts, log: &Logger) -> Result<()> {
    let setup = CommandSetup::init(config, log)?;
    log.stage("Removing links");
    unlink_all(&setup.store, &opts.names, log);
    finish(log)
}

/// Unapply each named entry.  Destinations that are not our symlink are
/// left alone and reported as unchanged.
pub fn unlink_all(store: &Store, names: &[String], log: &Logger) {
    for name in names {
        match store.unapply(name) {
            Ok(LinkChange::Removed) => {
                log.info(&format!("\t{name}: unlinked"));
                log.record(name, Outcome::Changed, None);
            }
            Ok(LinkChange::Untouched(state)) => {
                log.debug(&format!("{name}: {state}, nothing to remove"));
                log.record(name, Outcome::Unchanged, Some(&state.to_string()));
            }
            Ok(change) => {
                log.debug(&format!("{name}: {change:?}"));
                log.record(name, Outcome::Unchanged, None);
            }
            Err(e) => {
                log.error(&format!("{name}: {e}"));
                log.record(name, Outcome::Failed, Some(&e.to_string()));
            }
        }
    }
}
