use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI entry point for the symlink manager.
#[derive(Parser, Debug)]
#[command(
    name = "sto",
    about = "Track files kept in a root directory and the symlinks that point at them",
    version
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Operate on this root instead of the active profile
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Settings file (default: $XDG_CONFIG_HOME/sto/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a store in the current directory (or --root) and make it active
    Init(InitOpts),
    /// Show every entry and whether its symlink is in place
    List,
    /// Create the symlinks for the named entries
    Push(PushOpts),
    /// Move an item into the root and leave a symlink in its place
    Pull(PullOpts),
    /// Track an item that already lives in the root
    Add(AddOpts),
    /// Change the name of an entry
    Rename(RenameOpts),
    /// Move an entry's source to a new path inside the root
    Move(MoveOpts),
    /// Remove the symlinks for the named entries, keeping the entries
    Unlink(NamesOpts),
    /// Unlink and forget the named entries
    Delete(NamesOpts),
    /// Make a registered profile the active one
    Switch(SwitchOpts),
    /// List registered profiles
    Profiles,
    /// Generate shell completions
    Completions(CompletionsOpts),
    /// Print version information
    Version,
}

impl Command {
    /// Name used for the per-command log file.
    #[must_use]
    pub const fn log_name(&self) -> &'static str {
        match self {
            Self::Init(_) => "init",
            Self::List => "list",
            Self::Push(_) => "push",
            Self::Pull(_) => "pull",
            Self::Add(_) => "add",
            Self::Rename(_) => "rename",
            Self::Move(_) => "move",
            Self::Unlink(_) => "unlink",
            Self::Delete(_) => "delete",
            Self::Switch(_) => "switch",
            Self::Profiles => "profiles",
            Self::Completions(_) => "completions",
            Self::Version => "version",
        }
    }
}

/// Options for the `init` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct InitOpts {
    /// Profile name (default: the directory name)
    #[arg(long)]
    pub name: Option<String>,
}

/// Options for the `push` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct PushOpts {
    /// Entries to link
    #[arg(required = true)]
    pub names: Vec<String>,

    /// Replace conflicting files and directories without asking
    #[arg(short, long)]
    pub force: bool,
}

/// Options for the `pull` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct PullOpts {
    /// File or directory to move into the root
    pub target: PathBuf,

    /// Entry name (default: the item's file name)
    #[arg(long)]
    pub name: Option<String>,

    /// Do not ask for confirmation
    #[arg(short, long)]
    pub yes: bool,
}

/// Options for the `add` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct AddOpts {
    /// Item inside the root
    pub source: PathBuf,

    /// Where the symlink should live
    pub destination: PathBuf,

    /// Entry name (default: the source path relative to the root)
    #[arg(long)]
    pub name: Option<String>,

    /// Replace a conflicting file or directory without asking
    #[arg(short, long)]
    pub force: bool,
}

/// Options for the `rename` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct RenameOpts {
    /// Current entry name
    pub entry: String,

    /// New entry name
    pub new_name: String,
}

/// Options for the `move` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct MoveOpts {
    /// Entry to move
    pub entry: String,

    /// New source path inside the root
    pub new_path: PathBuf,
}

/// Options for subcommands that take a list of entry names.
#[derive(Parser, Debug, Clone)]
pub struct NamesOpts {
    /// Entry names
    #[arg(required = true)]
    pub names: Vec<String>,
}

/// Options for the `switch` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct SwitchOpts {
    /// Registered profile name
    pub profile: String,
}

/// Options for the `completions` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct CompletionsOpts {
    /// Target shell
    pub shell: clap_complete::Shell,
}
