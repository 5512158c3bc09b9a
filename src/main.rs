//! Command-line entry point for `sto`.
use std::io::{self, Write as _};

use anyhow::Result;
use clap::{CommandFactory as _, Parser as _};

use sto_cli::cli::{Cli, Command};
use sto_cli::commands;
use sto_cli::config::{Config, Env};
use sto_cli::logging::{self, Logger};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();

    match &args.command {
        Command::Completions(opts) => {
            clap_complete::generate(opts.shell, &mut Cli::command(), "sto", &mut io::stdout());
            return Ok(());
        }
        Command::Version => {
            let version = option_env!("STO_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
            writeln!(io::stdout(), "sto {version}")?;
            return Ok(());
        }
        _ => {}
    }

    let env = Env::from_process();
    let log_file =
        logging::default_log_dir(&env).map(|dir| logging::log_file_path(&dir, args.command.log_name()));
    logging::init_subscriber(args.verbose, log_file.as_deref());
    let log = Logger::new(log_file);

    let config = Config::load(
        &env,
        args.global.config.as_deref(),
        args.global.root.as_deref(),
    )?;

    match &args.command {
        Command::Init(opts) => commands::init::run(&config, opts, &log),
        Command::List => commands::list::run(&config, &log),
        Command::Push(opts) => commands::push::run(&config, opts, &log),
        Command::Pull(opts) => commands::pull::run(&config, opts, &log),
        Command::Add(opts) => commands::add::run(&config, opts, &log),
        Command::Rename(opts) => commands::rename::run(&config, opts, &log),
        Command::Move(opts) => commands::move_entry::run(&config, opts, &log),
        Command::Unlink(opts) => commands::unlink::run(&config, opts, &log),
        Command::Delete(opts) => commands::delete::run(&config, opts, &log),
        Command::Switch(opts) => commands::switch::run(&config, opts, &log),
        Command::Profiles => commands::profiles::run(&config, &log),
        Command::Completions(_) | Command::Version => Ok(()),
    }
}
