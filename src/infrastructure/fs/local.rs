//! Local File System Implementation
//!
//! Implements the FileSystem port for local disk operations.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use crate::domain::ports::file_system::{FileSystem, FsError, FsResult};
use crate::domain::value_objects::managed_name::{BACKUP_SUFFIX, TEMP_PREFIX, TEMP_SUFFIX};

/// Location of the backup copy for `path`
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(BACKUP_SUFFIX);
    path.with_file_name(name)
}

/// Write content atomically: temp sibling, fsync, rename.
///
/// The temporary file is removed if anything fails before the rename, so the
/// destination is either fully replaced or untouched.
pub fn atomic_write(path: &Path, content: &[u8]) -> FsResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| FsError::io(dir, e))?;

    let mut tmp = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .suffix(TEMP_SUFFIX)
        .tempfile_in(dir)
        .map_err(|e| FsError::io(dir, e))?;

    tmp.write_all(content)
        .map_err(|e| FsError::io(tmp.path(), e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| FsError::io(tmp.path(), e))?;

    tmp.persist(path).map_err(|e| FsError::io(path, e.error))?;
    Ok(())
}

/// Local file system implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl LocalFs {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for LocalFs {
    fn read(&self, path: &Path) -> FsResult<Option<Vec<u8>>> {
        match fs::read(path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(FsError::io(path, e)),
        }
    }

    fn write(&self, path: &Path, content: &[u8]) -> FsResult<()> {
        atomic_write(path, content)
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn remove(&self, path: &Path) -> FsResult<()> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(FsError::io(path, e)),
        }
    }

    fn list_files(&self, root: &Path) -> FsResult<Vec<PathBuf>> {
        if !root.is_dir() {
            return Ok(Vec::new());
        }

        let walker = WalkBuilder::new(root)
            .standard_filters(false)
            .follow_links(false)
            .build();

        let mut files = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| FsError::Io {
                path: root.to_path_buf(),
                source: std::io::Error::other(e.to_string()),
            })?;
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            if let Ok(rel) = entry.path().strip_prefix(root) {
                files.push(rel.to_path_buf());
            }
        }
        files.sort();
        Ok(files)
    }

    fn backup(&self, path: &Path) -> FsResult<bool> {
        if !path.is_file() {
            return Ok(false);
        }
        let backup = backup_path(path);
        fs::copy(path, &backup).map_err(|e| FsError::io(&backup, e))?;
        Ok(true)
    }

    fn restore(&self, path: &Path) -> FsResult<()> {
        let backup = backup_path(path);
        fs::rename(&backup, path).map_err(|e| FsError::io(&backup, e))
    }

    fn discard_backup(&self, path: &Path) -> FsResult<()> {
        self.remove(&backup_path(path))
    }

    fn prune_empty_parents(&self, root: &Path, removed: &Path) -> FsResult<Vec<PathBuf>> {
        let mut pruned = Vec::new();
        let Ok(rel) = removed.strip_prefix(root) else {
            return Ok(pruned);
        };

        let mut dir = rel.parent();
        while let Some(current) = dir.filter(|d| !d.as_os_str().is_empty()) {
            let path = root.join(current);
            let is_empty = match fs::read_dir(&path) {
                Ok(mut entries) => entries.next().is_none(),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => break,
                Err(e) => return Err(FsError::io(&path, e)),
            };
            if !is_empty {
                break;
            }
            fs::remove_dir(&path).map_err(|e| FsError::io(&path, e))?;
            pruned.push(path);
            dir = current.parent();
        }
        Ok(pruned)
    }
}
