//! Symlink store engine.
//!
//! A *store* is a `.sto` file inside a root directory listing named entries.
//! Each entry maps a source inside the root to a destination elsewhere on the
//! filesystem, and the tool keeps a symlink at the destination pointing back
//! at the source.
//!
//! The public API is organised into layers:
//!
//! - **[`link`]**: classify and reconcile one source/destination pair
//! - **[`store`]**: the persisted entry set and the profile registry
//! - **[`config`]**: settings file, state directory and active root
//! - **[`commands`]**: top-level subcommand orchestration
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod link;
pub mod logging;
pub mod paths;
pub mod store;
