//! Command handlers
//!
//! Each handler builds the use case from the loaded context, runs it, and
//! returns whether the invocation succeeded.

mod clean;
mod status;
mod sync;

pub use clean::cmd_clean;
pub use status::cmd_status;
pub use sync::cmd_sync;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context as _, Result};

use keepsync::config::{self, Config};
use keepsync::domain::ports::SyncEventSink;
use keepsync::infrastructure::{ConsoleEventSink, JsonEventSink};
use keepsync::{CancelToken, SourceArgs};

use crate::cli::{Cli, SourceFlags};

/// Settings shared by every command
pub struct Context {
    pub config: Config,
    pub destination: PathBuf,
    pub json: bool,
    pub verbose: u8,
    pub cancel: CancelToken,
}

impl Context {
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("cannot determine working directory")?;
        let (config, warnings) = config::load_layered(cli.config.as_deref(), &cwd)?;
        for warning in &warnings {
            eprintln!("warning: {warning}");
        }

        let destination = cli
            .destination
            .clone()
            .or_else(|| config.destination.clone())
            .unwrap_or_else(|| cwd.clone());

        let cancel = CancelToken::new();
        let handler_token = cancel.clone();
        ctrlc::set_handler(move || handler_token.cancel())
            .context("cannot install Ctrl+C handler")?;

        Ok(Self {
            config,
            destination,
            json: cli.json,
            verbose: cli.verbose,
            cancel,
        })
    }

    pub fn events(&self) -> Arc<dyn SyncEventSink> {
        if self.json {
            Arc::new(JsonEventSink::stdout())
        } else {
            Arc::new(ConsoleEventSink::stdout(self.verbose > 0))
        }
    }

    /// Configured source arguments with command-line overrides applied
    pub fn source_args(&self, flags: &SourceFlags) -> Result<SourceArgs> {
        let mut source = self.config.source.clone();
        if let Some(provider) = &flags.provider {
            source.provider = provider.clone();
        }
        if let Some(repo) = &flags.repo {
            source.repo = repo.clone();
        }
        if let Some(reference) = &flags.reference {
            source.reference = reference.clone();
        }
        if let Some(path) = &flags.path {
            source.path = path.clone();
        }

        let config = Config {
            source,
            ..self.config.clone()
        };
        match config.source_args() {
            Some(args) => Ok(args),
            None => bail!(
                "no source repository configured; set [source] repo in {} or pass --repo",
                config::CONFIG_FILE_NAME
            ),
        }
    }
}
