//! In-memory provider for library-level tests.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use keepsync::domain::ports::{Provider, ProviderError, ProviderRegistry, ProviderResult};
use keepsync::{CancelToken, SourceArgs};

/// Remote held in memory. Every mutation bumps the fingerprint.
#[derive(Default)]
pub struct FakeProvider {
    files: Mutex<BTreeMap<String, Vec<u8>>>,
    revision: Mutex<u32>,
    archive: Mutex<Option<Vec<u8>>>,
}

impl FakeProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_files(files: &[(&str, &str)]) -> Arc<Self> {
        let provider = Self::new();
        for (path, content) in files {
            provider.put(path, content);
        }
        provider
    }

    pub fn put(&self, path: &str, content: &str) {
        self.put_bytes(path, content.as_bytes());
    }

    pub fn put_bytes(&self, path: &str, content: &[u8]) {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_string(), content.to_vec());
        self.bump();
    }

    pub fn delete(&self, path: &str) {
        self.files.lock().unwrap().remove(path);
        self.bump();
    }

    pub fn set_archive(&self, bytes: &[u8]) {
        *self.archive.lock().unwrap() = Some(bytes.to_vec());
        self.bump();
    }

    pub fn registry(self: &Arc<Self>) -> ProviderRegistry {
        ProviderRegistry::new().with_provider(self.clone())
    }

    pub fn args(&self) -> SourceArgs {
        SourceArgs::new("fake", "fake://repo")
    }

    fn bump(&self) {
        *self.revision.lock().unwrap() += 1;
    }

    fn unsupported(&self) -> ProviderError {
        ProviderError::Unsupported {
            provider: "fake".to_string(),
            operation: "archives",
        }
    }
}

impl Provider for FakeProvider {
    fn name(&self) -> &str {
        "fake"
    }

    fn resolve_fingerprint(&self, _: &SourceArgs, _: &CancelToken) -> ProviderResult<String> {
        Ok(format!("rev-{}", self.revision.lock().unwrap()))
    }

    fn list_files(&self, _: &SourceArgs, _: &CancelToken) -> ProviderResult<Vec<String>> {
        Ok(self.files.lock().unwrap().keys().cloned().collect())
    }

    fn fetch(&self, _: &SourceArgs, path: &str, _: &CancelToken) -> ProviderResult<Vec<u8>> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| ProviderError::FileNotFound {
                provider: "fake".to_string(),
                path: path.to_string(),
            })
    }

    fn permalink(&self, _: &SourceArgs, fingerprint: &str, path: &str) -> String {
        format!("fake://{fingerprint}/{path}")
    }

    fn archive_locator(&self, _: &SourceArgs, fingerprint: &str) -> ProviderResult<String> {
        match *self.archive.lock().unwrap() {
            Some(_) => Ok(format!("fake://{fingerprint}.tar.gz")),
            None => Err(self.unsupported()),
        }
    }

    fn fetch_archive(
        &self,
        _: &SourceArgs,
        _: &str,
        _: &CancelToken,
    ) -> ProviderResult<Vec<u8>> {
        self.archive
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| self.unsupported())
    }
}
