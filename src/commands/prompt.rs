//! Interactive `[y/n]` confirmation.
use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::{Context as _, Result};

use crate::link::{ConflictDecision, ConflictResolver};

/// Asks yes/no questions on `output` and reads answers from `input`.
#[derive(Debug)]
pub struct Prompt<R, W> {
    input: R,
    output: W,
}

impl Prompt<io::StdinLock<'static>, io::Stdout> {
    /// Prompt on the process's stdin and stdout.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    /// Prompt over arbitrary streams.
    #[must_use]
    pub const fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print `question` followed by `[y/n]` and read one line.  Only an
    /// answer starting with `y` or `Y` counts as yes; end of input is no.
    ///
    /// # Errors
    ///
    /// Returns an error if writing the question or reading the answer fails.
    pub fn confirm(&mut self, question: &str) -> Result<bool> {
        write!(self.output, "{question} [y/n] ").context("writing prompt")?;
        self.output.flush().context("flushing prompt")?;

        let mut answer = String::new();
        self.input
            .read_line(&mut answer)
            .context("reading confirmation")?;
        Ok(answer.trim_start().starts_with(['y', 'Y']))
    }
}

impl<R: BufRead, W: Write> ConflictResolver for Prompt<R, W> {
    fn on_conflict(&mut self, destination: &Path) -> ConflictDecision {
        let question = format!(
            "{} already exists and is not a symlink. Delete it and link?",
            destination.display()
        );
        match self.confirm(&question) {
            Ok(true) => ConflictDecision::Overwrite,
            Ok(false) => ConflictDecision::Skip,
            Err(e) => {
                tracing::warn!("{e:#}");
                ConflictDecision::Skip
            }
        }
    }
}
