//! Provider port - access to a remote source
//!
//! A provider resolves the current version fingerprint of a source, lists
//! candidate files under the selected subtree, and fetches their bytes.
//! Providers are looked up by name in an explicit [`ProviderRegistry`].

use std::collections::HashMap;
use std::io;
use std::sync::Arc;

use thiserror::Error;

use crate::domain::value_objects::{CancelToken, SourceArgs};

/// Result type for provider operations
pub type ProviderResult<T> = Result<T, ProviderError>;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{provider}: source '{location}' not found")]
    SourceNotFound { provider: String, location: String },

    #[error("{provider}: remote file '{path}' not found")]
    FileNotFound { provider: String, path: String },

    /// The provider does not implement an optional capability
    #[error("{provider} does not support {operation}")]
    Unsupported {
        provider: String,
        operation: &'static str,
    },

    #[error("{provider}: operation cancelled")]
    Cancelled { provider: String },

    #[error("{provider}: {message}")]
    Failed { provider: String, message: String },

    #[error("{provider}: I/O error: {source}")]
    Io {
        provider: String,
        #[source]
        source: io::Error,
    },
}

/// Remote source capability
///
/// Calls are never retried by the caller. Remote paths are relative to the
/// selected subtree and use `/` separators.
pub trait Provider: Send + Sync {
    /// Registry name
    fn name(&self) -> &str;

    /// Opaque identifier of the current remote version
    fn resolve_fingerprint(&self, args: &SourceArgs, cancel: &CancelToken)
        -> ProviderResult<String>;

    /// Every candidate file under the selected subtree
    fn list_files(&self, args: &SourceArgs, cancel: &CancelToken) -> ProviderResult<Vec<String>>;

    /// Content of one remote file
    fn fetch(&self, args: &SourceArgs, path: &str, cancel: &CancelToken)
        -> ProviderResult<Vec<u8>>;

    /// Stable link to one remote file at a fingerprint
    fn permalink(&self, args: &SourceArgs, fingerprint: &str, path: &str) -> String;

    /// Where the archive of the source at a fingerprint lives
    fn archive_locator(&self, args: &SourceArgs, fingerprint: &str) -> ProviderResult<String> {
        let _ = (args, fingerprint);
        Err(ProviderError::Unsupported {
            provider: self.name().to_string(),
            operation: "archives",
        })
    }

    /// Archive bytes (tar.gz) of the source at a fingerprint
    fn fetch_archive(
        &self,
        args: &SourceArgs,
        fingerprint: &str,
        cancel: &CancelToken,
    ) -> ProviderResult<Vec<u8>> {
        let _ = (args, fingerprint, cancel);
        Err(ProviderError::Unsupported {
            provider: self.name().to_string(),
            operation: "archives",
        })
    }
}

/// Explicit name-to-provider table handed to the orchestrator
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn Provider>>,
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.names())
            .finish()
    }
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider under its own name, replacing any previous one
    pub fn register(&mut self, provider: Arc<dyn Provider>) {
        self.providers.insert(provider.name().to_string(), provider);
    }

    pub fn with_provider(mut self, provider: Arc<dyn Provider>) -> Self {
        self.register(provider);
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Provider>> {
        self.providers.get(name).cloned()
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.providers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
