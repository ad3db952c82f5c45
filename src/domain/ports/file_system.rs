//! FileSystem port - abstraction over file I/O operations
//!
//! This trait lets the domain and application layers touch the destination
//! tree without depending on a concrete implementation (local disk, or an
//! in-memory fake in tests).

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type for file system operations
pub type FsResult<T> = Result<T, FsError>;

/// File system operation errors
#[derive(Debug, Error)]
pub enum FsError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FsError {
    /// Attach a path to an I/O error, keeping the common kinds distinct
    pub fn io(path: impl Into<PathBuf>, err: io::Error) -> Self {
        let path = path.into();
        match err.kind() {
            io::ErrorKind::NotFound => FsError::NotFound(path),
            io::ErrorKind::PermissionDenied => FsError::PermissionDenied(path),
            _ => FsError::Io { path, source: err },
        }
    }
}

/// Abstract file system interface
///
/// All paths are absolute. Implementations must be shareable between the
/// worker threads of a sync pass.
pub trait FileSystem: Send + Sync {
    /// Read file content; `None` if the file does not exist
    fn read(&self, path: &Path) -> FsResult<Option<Vec<u8>>>;

    /// Write content atomically (temp sibling, fsync, rename)
    fn write(&self, path: &Path, content: &[u8]) -> FsResult<()>;

    /// Check if a regular file exists
    fn exists(&self, path: &Path) -> bool;

    /// Remove a file; removing a missing file is not an error
    fn remove(&self, path: &Path) -> FsResult<()>;

    /// Every regular file under `root`, relative to it, hidden files included
    fn list_files(&self, root: &Path) -> FsResult<Vec<PathBuf>>;

    /// Copy `path` to its backup location; `false` if there was nothing to back up
    fn backup(&self, path: &Path) -> FsResult<bool>;

    /// Move the backup of `path` back into place
    fn restore(&self, path: &Path) -> FsResult<()>;

    /// Delete the backup of `path`, if any
    fn discard_backup(&self, path: &Path) -> FsResult<()>;

    /// Remove the now-empty ancestors of `removed`, nearest first, stopping
    /// at the first non-empty one; `root` itself is kept
    fn prune_empty_parents(&self, root: &Path, removed: &Path) -> FsResult<Vec<PathBuf>>;
}
