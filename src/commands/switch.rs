//! Command: make a registered profile active.
use anyhow::{Context as _, Result};

use crate::cli::SwitchOpts;
use crate::config::Config;
use crate::logging::Logger;

/// Run the switch command.
///
/// # Errors
///
/// Returns an error if the profile is unknown or its store is gone.
pub fn run(config: &Config, opts: &SwitchOpts, log: &Logger) -> Result<()> {
    let registry = config.registry()?;
    let store = registry
        .open(&opts.profile, config.home.clone())
        .with_context(|| format!("switching to '{}'", opts.profile))?;
    config.set_current_root(store.root())?;
    log.info(&format!(
        "active profile: {} ({})",
        opts.profile,
        store.root().display()
    ));
    Ok(())
}
