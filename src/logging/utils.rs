//! Log file locations, ANSI stripping and timestamps.
use std::path::{Path, PathBuf};

use crate::config::{APP_DIR, Env};

/// Strip ANSI escape sequences from a string.
///
/// Handles SGR sequences (ending in `m`) and other CSI sequences (ending in
/// any letter in the `@`..`~` range) without consuming unrelated text.
pub(super) fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            if let Some(next) = chars.next()
                && next == '['
            {
                for inner in chars.by_ref() {
                    if ('@'..='~').contains(&inner) {
                        break;
                    }
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// `$XDG_CACHE_HOME/sto` (default `~/.cache/sto`), or `None` when neither
/// variable is set.
#[must_use]
pub fn default_log_dir(env: &Env) -> Option<PathBuf> {
    let cache = env
        .cache_home
        .clone()
        .or_else(|| env.home.as_ref().map(|home| home.join(".cache")))?;
    Some(cache.join(APP_DIR))
}

/// `<dir>/<command>.log`.
#[must_use]
pub fn log_file_path(dir: &Path, command: &str) -> PathBuf {
    dir.join(format!("{command}.log"))
}

/// Format the current UTC time as `YYYY-MM-DD HH:MM:SS`.
pub(super) fn format_utc_datetime() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Format the current UTC time as `HH:MM:SS`.
pub(super) fn format_utc_time() -> String {
    chrono::Utc::now().format("%H:%M:%S").to_string()
}
