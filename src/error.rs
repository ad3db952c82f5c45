//! Error types for keepsync
//!
//! Uses `thiserror` for library errors. Port-level errors (file system,
//! state store, provider) convert into [`KeepsyncError`] so use cases can
//! propagate them with `?`.

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::ports::{FsError, ProviderError, StateError};
use crate::domain::services::ClassifyError;

/// Result type alias for keepsync operations
pub type KeepsyncResult<T> = Result<T, KeepsyncError>;

/// Main error type for keepsync operations
#[derive(Error, Debug)]
pub enum KeepsyncError {
    /// Persisted state could not be loaded or saved
    #[error(transparent)]
    State(#[from] StateError),

    /// Remote source access failed
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// File system operation failed
    #[error(transparent)]
    Fs(#[from] FsError),

    /// A file could not be classified
    #[error(transparent)]
    Classify(#[from] ClassifyError),

    /// No provider registered under the requested name
    #[error("unknown provider '{name}' (registered: {available})")]
    UnknownProvider { name: String, available: String },

    /// Recorded state does not match the current remote
    #[error("state is stale: recorded fingerprint '{recorded}', remote is at '{current}'")]
    Stale { recorded: String, current: String },

    /// A tracked path does not carry the managed naming marker
    #[error("tracked path '{path}' does not follow the managed naming convention")]
    NamingViolation { path: String },

    /// Path escapes the destination root
    #[error("path '{path}' escapes destination root '{root}'")]
    PathEscape { path: PathBuf, root: PathBuf },

    /// Invalid copy pattern
    #[error("invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// Configuration could not be read or parsed
    #[error("invalid configuration in {file}: {message}")]
    InvalidConfig { file: PathBuf, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
