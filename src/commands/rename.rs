//! Command: change an entry's name.
use anyhow::{Context as _, Result};

use super::CommandSetup;
use crate::cli::RenameOpts;
use crate::config::Config;
use crate::logging::Logger;

/// Run the rename command.
///
/// # Errors
///
/// Returns an error if the entry is missing, the new name is taken, or the
/// store cannot be written.
pub fn run(config: &Config, opts: &RenameOpts, log: &Logger) -> Result<()> {
    let mut setup = CommandSetup::init(config, log)?;
    setup
        .store
        .rename(&opts.entry, &opts.new_name)
        .with_context(|| format!("renaming '{}'", opts.entry))?;
    log.info(&format!("renamed '{}' to '{}'", opts.entry, opts.new_name));
    Ok(())
}
