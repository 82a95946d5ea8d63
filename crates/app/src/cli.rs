use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug, PartialEq)]
#[command(name = "githerd")]
#[command(about = "Keep a herd of local Git repositories fetched, synced and tagged")]
pub struct CliArgs {
    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Git executable to shell out to (overrides config)
    #[arg(long)]
    pub git: Option<String>,

    /// Path to the tracked repository list (overrides config)
    #[arg(long)]
    pub repo_list: Option<PathBuf>,

    /// Restrict the command to these repository names
    #[arg(long, global = true, value_delimiter = ',')]
    pub repos: Vec<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Refresh every tracked repository and print the status table
    List {
        /// Column to order the table by
        #[arg(long, value_enum, default_value_t = SortOrder::Status)]
        sort: SortOrder,

        /// Print records as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Start tracking a repository
    Add {
        /// Path to the repository working tree
        path: PathBuf,
    },
    /// Stop tracking a repository (the working tree is untouched)
    Remove {
        /// Repository name as shown by `list`
        name: String,
    },
    /// Scan a folder one level deep and track the repositories it holds
    Import {
        /// Folder to scan, or a repository to track directly
        path: PathBuf,

        /// Track every repository found, not just configured favorites
        #[arg(long)]
        all: bool,
    },
    /// Commit in repositories with uncommitted changes
    Commit {
        /// Commit message
        #[arg(short, long)]
        message: String,

        /// Push after committing
        #[arg(long)]
        push: bool,
    },
    /// Push pending commits
    Push,
    /// Pull with rebase
    Pull,
    /// Pull with rebase, then push
    Sync,
    /// Fetch and hard-reset onto the remote branch, discarding local state
    ForceSync,
    /// Remove .build directories
    Clean,
    /// Create a tag and push it
    Tag {
        /// Repository name as shown by `list`
        name: String,

        /// Tag to create (defaults to the suggested next version)
        #[arg(long)]
        version: Option<String>,
    },
    /// Print the suggested next version for a repository
    NextVersion {
        /// Repository name as shown by `list`
        name: String,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Name,
    Branch,
    Status,
}
