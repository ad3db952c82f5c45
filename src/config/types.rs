//! Configuration types

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{ArchiveArgs, CopyArgs, SourceArgs};
use crate::error::KeepsyncResult;

use super::loader::{self, ConfigWarning};

/// Where to mirror from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Provider name in the registry
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Repository identity (for `dir`, a directory)
    #[serde(default)]
    pub repo: String,
    #[serde(default, rename = "ref")]
    pub reference: String,
    /// Subtree inside the repository
    #[serde(default)]
    pub path: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            repo: String::new(),
            reference: String::new(),
            path: String::new(),
        }
    }
}

fn default_provider() -> String {
    "dir".to_string()
}

/// Sync pass tuning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Parallel per-file workers (1 = sequential)
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Run the validator and reaper after every sync
    #[serde(default)]
    pub clean: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            clean: false,
        }
    }
}

fn default_concurrency() -> usize {
    4
}

/// Top-level configuration (`keepsync.toml`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Destination root; defaults to the working directory
    #[serde(default)]
    pub destination: Option<PathBuf>,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub copy: CopyArgs,
    #[serde(default)]
    pub archive: ArchiveArgs,
    #[serde(default)]
    pub sync: SyncConfig,
}

impl Config {
    pub fn load(path: &Path) -> KeepsyncResult<Self> {
        loader::load_with_warnings(path).map(|(config, _)| config)
    }

    pub fn load_with_warnings(path: &Path) -> KeepsyncResult<(Self, Vec<ConfigWarning>)> {
        loader::load_with_warnings(path)
    }

    /// Source arguments for a pass; `None` until a repository is configured
    pub fn source_args(&self) -> Option<SourceArgs> {
        if self.source.repo.trim().is_empty() {
            return None;
        }
        Some(
            SourceArgs::new(&self.source.provider, &self.source.repo)
                .with_ref(&self.source.reference)
                .with_path(&self.source.path)
                .with_copy_args(self.copy.clone())
                .with_archive_args(self.archive.clone()),
        )
    }
}
