//! keepsync - mirror a remote subtree without clobbering local edits
//!
//! keepsync copies files from a remote source into a local destination tree
//! under managed names (`name.copy.ext`). Local edits to those copies are
//! detected, recorded as edit scripts, and carried across remote updates.
//! Everything it knows lives in a single lock file at the destination root.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;

// Re-exports for convenience
pub use application::{
    CleanReport, CleanUseCase, RequestMode, RunOutcome, StatusReport, SyncOptions, SyncReport,
    SyncUseCase,
};
pub use config::Config;
pub use domain::entities::StateDocument;
pub use domain::services::{EditScript, FileStatus};
pub use domain::value_objects::{CancelToken, ContentHash, SourceArgs};
pub use error::{KeepsyncError, KeepsyncResult};
pub use infrastructure::{default_registry, JsonStateRepository, LocalFs, STATE_FILE_NAME};
