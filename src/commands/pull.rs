//! Command: move an outside item into the root and link it back.
use std::io::{BufRead, Write};

use anyhow::{Context as _, Result};

use super::prompt::Prompt;
use super::{CommandSetup, absolute};
use crate::cli::PullOpts;
use crate::config::Config;
use crate::logging::Logger;
use crate::store::{Entry, Store};

/// Run the pull command.
///
/// # Errors
///
/// Returns an error if the store cannot be opened or the item cannot be
/// adopted.
pub fn run(config: &Config, opts: &PullOpts, log: &Logger) -> Result<()> {
    let mut setup = CommandSetup::init(config, log)?;
    let target = absolute(&config.home.expand(&opts.target))?;
    pull(
        &mut setup.store,
        &target,
        opts.name.as_deref(),
        (!opts.yes).then(Prompt::stdio).as_mut(),
        log,
    )?;
    Ok(())
}

/// Adopt `target`, asking for confirmation first when a prompt is given.
/// Returns `None` if the user declined.
///
/// # Errors
///
/// Returns the prompt error or the store error from the adoption.
pub fn pull<R: BufRead, W: Write>(
    store: &mut Store,
    target: &std::path::Path,
    name: Option<&str>,
    prompt: Option<&mut Prompt<R, W>>,
    log: &Logger,
) -> Result<Option<Entry>> {
    if let Some(prompt) = prompt {
        let question = format!(
            "Move {} into {} and link it back?",
            target.display(),
            store.root().display()
        );
        if !prompt.confirm(&question)? {
            log.info("aborted, nothing moved");
            return Ok(None);
        }
    }

    let entry = store
        .adopt(target, name)
        .with_context(|| format!("pulling {}", target.display()))?;
    log.info(&format!("pulled '{}': {}", entry.name, entry.link().description()));
    Ok(Some(entry))
}
