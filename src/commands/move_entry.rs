//! Command: relocate an entry's source inside the root.
use anyhow::{Context as _, Result};

use super::{CommandSetup, absolute};
use crate::cli::MoveOpts;
use crate::config::Config;
use crate::error::StoreError;
use crate::logging::Logger;

/// Run the move command.
///
/// # Errors
///
/// Returns an error if the move is rejected or fails.  A failed re-link after
/// a successful move is reported with a hint to run `sto push`.
pub fn run(config: &Config, opts: &MoveOpts, log: &Logger) -> Result<()> {
    let mut setup = CommandSetup::init(config, log)?;
    let new_path = absolute(&opts.new_path)?;

    match setup.store.move_entry(&opts.entry, &new_path) {
        Ok(entry) => {
            log.info(&format!("moved '{}' to {}", entry.name, entry.source.display()));
            Ok(())
        }
        Err(e @ StoreError::RelinkFailed { .. }) => {
            log.warn(&format!(
                "'{}' was moved but not re-linked, run 'sto push {}'",
                opts.entry, opts.entry
            ));
            Err(e.into())
        }
        Err(e) => Err(e).with_context(|| format!("moving '{}'", opts.entry)),
    }
}
