//! StateRepository port - abstraction for lock file persistence
//!
//! This trait lets the application layer load and save the state document
//! without knowing about JSON serialization, compression, or the save marker.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::entities::StateDocument;

/// Result type for state operations
pub type StateResult<T> = Result<T, StateError>;

/// State store errors
#[derive(Debug, Error)]
pub enum StateError {
    /// The lock file exists but cannot be parsed; never repaired automatically
    #[error("state file {} is corrupted: {message}", path.display())]
    Corrupted { path: PathBuf, message: String },

    /// Another save is in progress (or a previous one crashed)
    #[error(
        "state is being saved by another process; remove {} if no other keepsync is running",
        marker.display()
    )]
    Locked { marker: PathBuf },

    #[error("unsupported state version {found} (this build reads version {expected})")]
    VersionMismatch { found: u32, expected: u32 },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Abstract repository for state persistence
pub trait StateRepository: Send + Sync {
    /// Load the document; a missing file yields a fresh empty document
    fn load(&self, path: &Path) -> StateResult<StateDocument>;

    /// Persist the document atomically under the save marker
    fn save(&self, doc: &StateDocument, path: &Path) -> StateResult<()>;
}
