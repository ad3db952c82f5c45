use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// keepsync - mirror a remote subtree without clobbering local edits
#[derive(Parser, Debug)]
#[command(name = "keepsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Emit newline-delimited JSON events
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file (default: keepsync.toml, then the user config)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Destination root (overrides the configuration)
    #[arg(short, long, global = true)]
    pub destination: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Overrides for the configured source
#[derive(Args, Debug, Default, Clone)]
pub struct SourceFlags {
    /// Provider name
    #[arg(long)]
    pub provider: Option<String>,

    /// Repository to mirror from
    #[arg(long)]
    pub repo: Option<String>,

    /// Revision of the repository
    #[arg(long = "ref")]
    pub reference: Option<String>,

    /// Subtree inside the repository
    #[arg(long)]
    pub path: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Mirror the remote into the destination
    Sync {
        #[command(flatten)]
        source: SourceFlags,

        /// Run even if nothing changed since the last sync
        #[arg(short, long)]
        force: bool,

        /// Validate and reap orphans afterwards
        #[arg(long)]
        clean: bool,

        /// Parallel file workers
        #[arg(short = 'j', long)]
        concurrency: Option<usize>,
    },

    /// Show how tracked files differ from what was mirrored
    Status {
        #[command(flatten)]
        source: SourceFlags,

        /// Fail if the remote moved since the last sync
        #[arg(long)]
        remote: bool,
    },

    /// Validate the destination and remove orphaned files
    Clean,
}
