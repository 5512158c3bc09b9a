//! Command: list registered profiles.
use std::io::{self, Write};

use anyhow::{Context as _, Result};

use crate::config::Config;
use crate::logging::Logger;
use crate::store::collection::Profile;

/// Run the profiles command.
///
/// # Errors
///
/// Returns an error if the registry cannot be loaded or stdout is closed.
pub fn run(config: &Config, log: &Logger) -> Result<()> {
    let registry = config.registry()?;
    let profiles = registry.profiles();
    if profiles.is_empty() {
        log.info("no profiles registered, use 'sto init'");
        return Ok(());
    }
    let active = config.resolve_root().ok();
    let active = active.as_deref().and_then(|root| registry.name_for(root));
    write_profiles(&profiles, active, &mut io::stdout().lock())
}

/// One line per profile; the one named `active` is marked with `*`.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_profiles(
    profiles: &[Profile],
    active: Option<&str>,
    out: &mut impl Write,
) -> Result<()> {
    for profile in profiles {
        let marker = if active == Some(profile.name.as_str()) {
            '*'
        } else {
            ' '
        };
        writeln!(out, "{marker} {}\t{}", profile.name, profile.root.display())
            .context("writing profiles")?;
    }
    Ok(())
}
