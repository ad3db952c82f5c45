//! Sync options

use std::path::PathBuf;

use crate::domain::value_objects::SourceArgs;

/// What a single invocation should do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
    /// Full pass, short-circuited when nothing moved
    Sync,
    /// Full pass, never short-circuited
    Force,
    /// Validator and reaper only; nothing is fetched
    Clean,
    /// Classify tracked files against the disk without fetching
    LocalStatus,
    /// Local status, failing if the remote moved since the last pass
    RemoteStatus,
}

impl RequestMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestMode::Sync => "sync",
            RequestMode::Force => "force",
            RequestMode::Clean => "clean",
            RequestMode::LocalStatus => "status",
            RequestMode::RemoteStatus => "remote-status",
        }
    }
}

/// Options for one pass over a destination tree
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Destination root
    pub destination: PathBuf,
    pub args: SourceArgs,
    /// Bypass the up-to-date short-circuit
    pub force: bool,
    /// Run the validator and reaper after the pass
    pub clean: bool,
    /// Parallel per-file workers (1 = sequential)
    pub concurrency: usize,
}

impl SyncOptions {
    pub fn new(destination: impl Into<PathBuf>, args: SourceArgs) -> Self {
        Self {
            destination: destination.into(),
            args,
            force: false,
            clean: false,
            concurrency: 1,
        }
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn with_clean(mut self, clean: bool) -> Self {
        self.clean = clean;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }
}
