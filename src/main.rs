//! keepsync CLI
//!
//! Usage: keepsync <COMMAND>
//!
//! Commands:
//!   sync    Mirror the remote into the destination
//!   status  Show how tracked files differ from what was mirrored
//!   clean   Validate the destination and remove orphaned files

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env("KEEPSYNC_LOG")
        .unwrap_or_else(|_| EnvFilter::new(format!("keepsync={default}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let ctx = commands::Context::load(&cli)?;
    let success = match cli.command {
        Commands::Sync {
            source,
            force,
            clean,
            concurrency,
        } => commands::cmd_sync(&ctx, &source, force, clean, concurrency)?,
        Commands::Status { source, remote } => commands::cmd_status(&ctx, &source, remote)?,
        Commands::Clean => commands::cmd_clean(&ctx)?,
    };

    if !success {
        std::process::exit(1);
    }
    Ok(())
}
