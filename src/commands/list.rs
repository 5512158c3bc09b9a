//! Command: show every entry and its link state.
use std::io::{self, Write};

use anyhow::{Context as _, Result};

use super::CommandSetup;
use crate::config::Config;
use crate::error::StoreError;
use crate::link::LinkState;
use crate::logging::Logger;
use crate::paths::HomeDir;
use crate::store::{Entry, Store};

/// Run the list command.
///
/// # Errors
///
/// Returns an error if the store cannot be opened or stdout is closed.
pub fn run(config: &Config, log: &Logger) -> Result<()> {
    let setup = CommandSetup::init(config, log)?;
    if setup.store.is_empty() {
        log.info("no entries");
        return Ok(());
    }
    write_listing(&setup.store, &mut io::stdout().lock())
}

/// Write one block per entry, sorted by name.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_listing(store: &Store, out: &mut impl Write) -> Result<()> {
    for entry in store.list() {
        let state = entry.link().classify();
        writeln!(out, "{}", render(&entry, store.home(), &state)).context("writing listing")?;
    }
    Ok(())
}

/// Format a resolved entry and its classification.
///
/// A conflicting destination adds an indented second line describing what
/// is in the way.
#[must_use]
pub fn render(entry: &Entry, home: &HomeDir, state: &Result<LinkState, StoreError>) -> String {
    let source = home.compress(&entry.source);
    let destination = home.compress(&entry.destination);
    let mapping = format!("{} -> {}", source.display(), destination.display());

    let (tag, detail) = match state {
        Ok(LinkState::Linked) => ("Linked", None),
        Ok(LinkState::Unlinked) => ("Unlinked", None),
        Ok(LinkState::SourceMissing) => ("Broken", None),
        Ok(LinkState::ConflictingItem) => (
            "Unlinked",
            Some(format!("File Already Exists: {}", destination.display())),
        ),
        Ok(LinkState::ConflictingLink { target }) => (
            "Unlinked",
            Some(format!(
                "Conflict: {} -> {}",
                destination.display(),
                target.display()
            )),
        ),
        Err(e) => ("Error", Some(e.to_string())),
    };

    let mut line = format!("{}:\t[{tag}]\t{mapping}", entry.name);
    if let Some(detail) = detail {
        line.push_str("\n\t");
        line.push_str(&detail);
    }
    line
}
