//! Local directory provider
//!
//! Treats a directory on the local machine as the remote source. Useful for
//! vendoring from a sibling checkout and as the reference provider in tests.

use std::fs;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use tracing::debug;

use crate::domain::ports::provider::{Provider, ProviderError, ProviderResult};
use crate::domain::value_objects::managed_name::{is_safe_relative, normalize_path};
use crate::domain::value_objects::{CancelToken, ContentHash, SourceArgs};

const NAME: &str = "dir";

/// Provider reading from a local directory (`repo` = directory, `path` = subtree)
#[derive(Debug, Clone, Copy, Default)]
pub struct DirProvider;

impl DirProvider {
    pub fn new() -> Self {
        Self
    }

    fn root(args: &SourceArgs) -> PathBuf {
        let repo = PathBuf::from(&args.src_repo);
        if args.src_path.is_empty() {
            repo
        } else {
            repo.join(&args.src_path)
        }
    }

    fn check_cancel(cancel: &CancelToken) -> ProviderResult<()> {
        if cancel.is_cancelled() {
            return Err(ProviderError::Cancelled {
                provider: NAME.to_string(),
            });
        }
        Ok(())
    }

    fn io_error(source: std::io::Error) -> ProviderError {
        ProviderError::Io {
            provider: NAME.to_string(),
            source,
        }
    }

    fn read(root: &Path, path: &str) -> ProviderResult<Vec<u8>> {
        if !is_safe_relative(path) {
            return Err(ProviderError::Failed {
                provider: NAME.to_string(),
                message: format!("path '{path}' escapes the source root"),
            });
        }
        fs::read(root.join(path)).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ProviderError::FileNotFound {
                provider: NAME.to_string(),
                path: path.to_string(),
            },
            _ => Self::io_error(e),
        })
    }
}

impl Provider for DirProvider {
    fn name(&self) -> &str {
        NAME
    }

    /// Digest over the sorted `(path, digest)` pairs of every file
    fn resolve_fingerprint(
        &self,
        args: &SourceArgs,
        cancel: &CancelToken,
    ) -> ProviderResult<String> {
        let root = Self::root(args);
        let files = self.list_files(args, cancel)?;

        let mut manifest = Vec::new();
        for path in &files {
            Self::check_cancel(cancel)?;
            let digest = ContentHash::from_bytes(&Self::read(&root, path)?);
            manifest.extend_from_slice(path.as_bytes());
            manifest.push(0);
            manifest.extend_from_slice(digest.as_str().as_bytes());
            manifest.push(b'\n');
        }

        let fingerprint = ContentHash::from_bytes(&manifest).to_string();
        debug!(root = %root.display(), files = files.len(), %fingerprint, "resolved fingerprint");
        Ok(fingerprint)
    }

    fn list_files(&self, args: &SourceArgs, cancel: &CancelToken) -> ProviderResult<Vec<String>> {
        let root = Self::root(args);
        if !root.is_dir() {
            return Err(ProviderError::SourceNotFound {
                provider: NAME.to_string(),
                location: root.display().to_string(),
            });
        }

        let walker = WalkBuilder::new(&root)
            .standard_filters(false)
            .filter_entry(|e| e.file_name() != ".git")
            .build();

        let mut files = Vec::new();
        for entry in walker {
            Self::check_cancel(cancel)?;
            let entry = entry.map_err(|e| ProviderError::Failed {
                provider: NAME.to_string(),
                message: e.to_string(),
            })?;
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            if let Ok(rel) = entry.path().strip_prefix(&root) {
                files.push(normalize_path(rel));
            }
        }
        files.sort();
        Ok(files)
    }

    fn fetch(
        &self,
        args: &SourceArgs,
        path: &str,
        cancel: &CancelToken,
    ) -> ProviderResult<Vec<u8>> {
        Self::check_cancel(cancel)?;
        Self::read(&Self::root(args), path)
    }

    fn permalink(&self, args: &SourceArgs, _fingerprint: &str, path: &str) -> String {
        let full = Self::root(args).join(path);
        let absolute = fs::canonicalize(&full).unwrap_or(full);
        format!("file://{}", normalize_path(&absolute))
    }
}
