//! State document entity - the persisted record of a destination tree
//!
//! Tracks every mirrored file, the artifacts derived from them, and the
//! source arguments and fingerprint of the last successful pass. It's a pure
//! data structure; serialization lives in the state repository.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::domain::services::{ChangeRegion, EditScript};
use crate::domain::value_objects::{ContentHash, SourceArgs};

/// Current state format version
pub const STATE_VERSION: u32 = 1;

/// A mirrored ("copied") file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedFile {
    /// Destination path relative to the root (unique key)
    path: String,
    /// Remote path relative to the source subtree
    source: String,
    permalink: String,
    last_updated: DateTime<Utc>,
    /// Digest of the most recently fetched remote content
    remote_hash: Option<ContentHash>,
    /// Edit script from the latest remote content to the local content
    delta: EditScript,
    changes: Vec<ChangeRegion>,
    ignored: bool,
}

impl TrackedFile {
    pub fn new(path: impl Into<String>, source: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            path: path.into(),
            source: source.into(),
            permalink: String::new(),
            last_updated: now,
            remote_hash: None,
            delta: EditScript::empty(),
            changes: Vec::new(),
            ignored: false,
        }
    }

    pub fn with_permalink(mut self, permalink: impl Into<String>) -> Self {
        self.permalink = permalink.into();
        self
    }

    pub fn with_remote_hash(mut self, hash: Option<ContentHash>) -> Self {
        self.remote_hash = hash;
        self
    }

    pub fn with_delta(mut self, delta: EditScript) -> Self {
        self.set_delta(delta);
        self
    }

    pub fn with_ignored(mut self, ignored: bool) -> Self {
        self.ignored = ignored;
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn permalink(&self) -> &str {
        &self.permalink
    }

    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    pub fn remote_hash(&self) -> Option<&ContentHash> {
        self.remote_hash.as_ref()
    }

    pub fn delta(&self) -> &EditScript {
        &self.delta
    }

    pub fn changes(&self) -> &[ChangeRegion] {
        &self.changes
    }

    pub fn change_count(&self) -> usize {
        self.changes.len()
    }

    pub fn is_ignored(&self) -> bool {
        self.ignored
    }

    /// Whether a customization has been recorded for this file
    pub fn has_delta(&self) -> bool {
        !self.delta.is_empty()
    }

    pub fn set_permalink(&mut self, permalink: impl Into<String>) {
        self.permalink = permalink.into();
    }

    pub fn set_source(&mut self, source: impl Into<String>) {
        self.source = source.into();
    }

    pub fn set_remote_hash(&mut self, hash: ContentHash) {
        self.remote_hash = Some(hash);
    }

    /// Replace the recorded delta; change regions follow the script.
    /// A script with no changes is stored as the empty script.
    pub fn set_delta(&mut self, delta: EditScript) {
        self.changes = delta.regions();
        self.delta = if delta.is_empty() {
            EditScript::empty()
        } else {
            delta
        };
    }

    pub fn set_ignored(&mut self, ignored: bool) {
        self.ignored = ignored;
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_updated = now;
    }
}

/// A file derived from another tracked artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    path: String,
    last_updated: DateTime<Utc>,
    reference_file: String,
}

impl GeneratedFile {
    pub fn new(
        path: impl Into<String>,
        reference_file: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            path: path.into(),
            last_updated: now,
            reference_file: reference_file.into(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    pub fn reference_file(&self) -> &str {
        &self.reference_file
    }
}

/// An archive snapshot of the source at the recorded fingerprint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveRecord {
    path: String,
    hash: ContentHash,
    locator: String,
    last_updated: DateTime<Utc>,
}

impl ArchiveRecord {
    pub fn new(
        path: impl Into<String>,
        hash: ContentHash,
        locator: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            path: path.into(),
            hash,
            locator: locator.into(),
            last_updated: now,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn hash(&self) -> &ContentHash {
        &self.hash
    }

    pub fn locator(&self) -> &str {
        &self.locator
    }

    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }
}

/// The whole persisted state of one destination tree
#[derive(Debug, Clone, PartialEq)]
pub struct StateDocument {
    version: u32,
    last_updated: Option<DateTime<Utc>>,
    /// Fingerprint of the remote at the last pass
    commit_hash: String,
    args: Option<SourceArgs>,
    copied: BTreeMap<String, TrackedFile>,
    generated: BTreeMap<String, GeneratedFile>,
    archives: BTreeMap<String, ArchiveRecord>,
    /// Preserved content of ignored files, keyed by path (uncompressed)
    blobs: BTreeMap<String, Vec<u8>>,
    warnings: Vec<String>,
}

impl Default for StateDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl StateDocument {
    /// Create a fresh, empty document
    pub fn new() -> Self {
        Self {
            version: STATE_VERSION,
            last_updated: None,
            commit_hash: String::new(),
            args: None,
            copied: BTreeMap::new(),
            generated: BTreeMap::new(),
            archives: BTreeMap::new(),
            blobs: BTreeMap::new(),
            warnings: Vec::new(),
        }
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    pub fn set_last_updated(&mut self, now: DateTime<Utc>) {
        self.last_updated = Some(now);
    }

    pub fn commit_hash(&self) -> &str {
        &self.commit_hash
    }

    pub fn set_commit_hash(&mut self, fingerprint: impl Into<String>) {
        self.commit_hash = fingerprint.into();
    }

    pub fn args(&self) -> Option<&SourceArgs> {
        self.args.as_ref()
    }

    pub fn set_args(&mut self, args: SourceArgs) {
        self.args = Some(args);
    }

    /// Fingerprint of the recorded source arguments
    pub fn args_fingerprint(&self) -> Option<ContentHash> {
        self.args.as_ref().map(SourceArgs::fingerprint)
    }

    /// True when both the source arguments and the remote fingerprint match
    /// the last recorded pass.
    pub fn is_current(&self, args: &SourceArgs, fingerprint: &str) -> bool {
        !self.commit_hash.is_empty()
            && self.commit_hash == fingerprint
            && self.args_fingerprint() == Some(args.fingerprint())
    }

    // --- copied files ---

    pub fn tracked(&self, path: &str) -> Option<&TrackedFile> {
        self.copied.get(path)
    }

    pub fn tracked_files(&self) -> impl Iterator<Item = &TrackedFile> {
        self.copied.values()
    }

    pub fn tracked_paths(&self) -> impl Iterator<Item = &str> {
        self.copied.keys().map(String::as_str)
    }

    pub fn upsert_tracked(&mut self, file: TrackedFile) {
        self.copied.insert(file.path().to_string(), file);
    }

    /// Drop a record together with any preserved blob
    pub fn remove_tracked(&mut self, path: &str) -> Option<TrackedFile> {
        self.blobs.remove(path);
        self.copied.remove(path)
    }

    pub fn tracked_len(&self) -> usize {
        self.copied.len()
    }

    // --- generated files ---

    pub fn generated(&self, path: &str) -> Option<&GeneratedFile> {
        self.generated.get(path)
    }

    pub fn generated_files(&self) -> impl Iterator<Item = &GeneratedFile> {
        self.generated.values()
    }

    pub fn upsert_generated(&mut self, file: GeneratedFile) {
        self.generated.insert(file.path().to_string(), file);
    }

    pub fn remove_generated(&mut self, path: &str) -> Option<GeneratedFile> {
        self.generated.remove(path)
    }

    // --- archives ---

    pub fn archive(&self, path: &str) -> Option<&ArchiveRecord> {
        self.archives.get(path)
    }

    pub fn archives(&self) -> impl Iterator<Item = &ArchiveRecord> {
        self.archives.values()
    }

    pub fn upsert_archive(&mut self, record: ArchiveRecord) {
        self.archives.insert(record.path().to_string(), record);
    }

    /// Drop every archive record and the generated files derived from them
    pub fn clear_archives(&mut self) {
        let archives = std::mem::take(&mut self.archives);
        self.generated
            .retain(|_, g| !archives.contains_key(g.reference_file()));
    }

    // --- blobs ---

    pub fn blob(&self, path: &str) -> Option<&[u8]> {
        self.blobs.get(path).map(Vec::as_slice)
    }

    pub fn blobs(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.blobs.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn set_blob(&mut self, path: impl Into<String>, content: Vec<u8>) {
        self.blobs.insert(path.into(), content);
    }

    pub fn remove_blob(&mut self, path: &str) -> Option<Vec<u8>> {
        self.blobs.remove(path)
    }

    // --- warnings ---

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        let warning = warning.into();
        if !self.warnings.contains(&warning) {
            self.warnings.push(warning);
        }
    }

    pub fn clear_warnings(&mut self) {
        self.warnings.clear();
    }
}
