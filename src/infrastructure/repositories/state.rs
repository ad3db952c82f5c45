//! JSON State Repository
//!
//! Implements the StateRepository port. The state is stored as
//! `.keepsync.lock` (pretty JSON) next to the mirrored tree. Saves are
//! serialized by a sibling `.marker` file created with create-new semantics
//! and held under an exclusive `fs2` lock for the duration of the write.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::entities::{
    ArchiveRecord, GeneratedFile, StateDocument, TrackedFile, STATE_VERSION,
};
use crate::domain::ports::file_system::FileSystem;
use crate::domain::ports::state_repository::{StateError, StateRepository, StateResult};
use crate::domain::services::{ChangeRegion, EditScript};
use crate::domain::value_objects::managed_name::is_safe_relative;
use crate::domain::value_objects::{ContentHash, SourceArgs};
use crate::infrastructure::fs::LocalFs;

/// File name of the state document inside the destination root
pub const STATE_FILE_NAME: &str = ".keepsync.lock";

/// Location of the save marker for a state file
pub fn marker_path(state_path: &Path) -> PathBuf {
    let mut name = state_path.file_name().unwrap_or_default().to_os_string();
    name.push(".marker");
    state_path.with_file_name(name)
}

/// Held while a save is in progress; removed on drop
struct SaveMarker {
    path: PathBuf,
    file: File,
}

impl SaveMarker {
    fn acquire(state_path: &Path) -> StateResult<Self> {
        let path = marker_path(state_path);
        let io_err = |source| StateError::Io {
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(StateError::Locked {
                    marker: path.clone(),
                });
            }
            Err(e) => return Err(io_err(e)),
        };

        if file.try_lock_exclusive().is_err() {
            drop(file);
            let _ = fs::remove_file(&path);
            return Err(StateError::Locked { marker: path });
        }
        // Informational only
        let _ = writeln!(file, "{}", std::process::id());

        Ok(Self { path, file })
    }
}

impl Drop for SaveMarker {
    fn drop(&mut self) {
        let _ = self.file.unlock();
        if let Err(e) = fs::remove_file(&self.path) {
            warn!(marker = %self.path.display(), error = %e, "failed to remove save marker");
        }
    }
}

/// JSON-based state repository
pub struct JsonStateRepository {
    fs: LocalFs,
}

impl JsonStateRepository {
    pub fn new() -> Self {
        Self { fs: LocalFs::new() }
    }

    pub fn with_fs(fs: LocalFs) -> Self {
        Self { fs }
    }
}

impl Default for JsonStateRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct JsonChange {
    old_start: usize,
    old_lines: usize,
    new_start: usize,
    new_lines: usize,
}

impl From<&ChangeRegion> for JsonChange {
    fn from(r: &ChangeRegion) -> Self {
        Self {
            old_start: r.old_start,
            old_lines: r.old_lines,
            new_start: r.new_start,
            new_lines: r.new_lines,
        }
    }
}

/// Helper for serde skip_serializing_if
fn is_false(b: &bool) -> bool {
    !*b
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct JsonTrackedFile {
    file: String,
    #[serde(default)]
    source: String,
    #[serde(default)]
    permalink: String,
    last_updated: DateTime<Utc>,
    #[serde(default)]
    remote_hash: String,
    #[serde(default)]
    diff_delta: String,
    /// Derived from `diff_delta`; written for readers of the file
    #[serde(default)]
    changes: Vec<JsonChange>,
    #[serde(default, skip_serializing_if = "is_false")]
    ignored: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct JsonGeneratedFile {
    file: String,
    last_updated: DateTime<Utc>,
    reference_file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct JsonArchive {
    file: String,
    hash: String,
    #[serde(default)]
    locator: String,
    last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct JsonState {
    version: u32,
    #[serde(default)]
    last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    commit_hash: String,
    #[serde(default)]
    args: Option<SourceArgs>,
    #[serde(rename = "coppied_files", alias = "copied_files", default)]
    copied_files: BTreeMap<String, JsonTrackedFile>,
    #[serde(default)]
    generated_files: BTreeMap<String, JsonGeneratedFile>,
    #[serde(default)]
    archives: BTreeMap<String, JsonArchive>,
    /// Base64 of deflate-compressed content
    #[serde(default)]
    blobs: BTreeMap<String, String>,
    #[serde(default)]
    warnings: Vec<String>,
}

fn compress_blob(content: &[u8]) -> std::io::Result<String> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(content)?;
    Ok(STANDARD.encode(encoder.finish()?))
}

fn decompress_blob(encoded: &str) -> Result<Vec<u8>, String> {
    let compressed = STANDARD.decode(encoded).map_err(|e| e.to_string())?;
    let mut out = Vec::new();
    DeflateDecoder::new(compressed.as_slice())
        .read_to_end(&mut out)
        .map_err(|e| e.to_string())?;
    Ok(out)
}

fn to_json(doc: &StateDocument) -> std::io::Result<JsonState> {
    let copied_files = doc
        .tracked_files()
        .map(|f| {
            (
                f.path().to_string(),
                JsonTrackedFile {
                    file: f.path().to_string(),
                    source: f.source().to_string(),
                    permalink: f.permalink().to_string(),
                    last_updated: f.last_updated(),
                    remote_hash: f
                        .remote_hash()
                        .map(|h| h.to_string())
                        .unwrap_or_default(),
                    diff_delta: f.delta().encode(),
                    changes: f.changes().iter().map(JsonChange::from).collect(),
                    ignored: f.is_ignored(),
                },
            )
        })
        .collect();

    let generated_files = doc
        .generated_files()
        .map(|g| {
            (
                g.path().to_string(),
                JsonGeneratedFile {
                    file: g.path().to_string(),
                    last_updated: g.last_updated(),
                    reference_file: g.reference_file().to_string(),
                },
            )
        })
        .collect();

    let archives = doc
        .archives()
        .map(|a| {
            (
                a.path().to_string(),
                JsonArchive {
                    file: a.path().to_string(),
                    hash: a.hash().to_string(),
                    locator: a.locator().to_string(),
                    last_updated: a.last_updated(),
                },
            )
        })
        .collect();

    let mut blobs = BTreeMap::new();
    for (path, content) in doc.blobs() {
        blobs.insert(path.to_string(), compress_blob(content)?);
    }

    Ok(JsonState {
        version: doc.version(),
        last_updated: doc.last_updated(),
        commit_hash: doc.commit_hash().to_string(),
        args: doc.args().cloned(),
        copied_files,
        generated_files,
        archives,
        blobs,
        warnings: doc.warnings().to_vec(),
    })
}

fn from_json(state: JsonState, path: &Path) -> StateResult<StateDocument> {
    let corrupted = |message: String| StateError::Corrupted {
        path: path.to_path_buf(),
        message,
    };
    let check_key = |key: &str| {
        if is_safe_relative(key) {
            Ok(())
        } else {
            Err(corrupted(format!("path '{key}' is not relative to the root")))
        }
    };

    if state.version != STATE_VERSION {
        return Err(StateError::VersionMismatch {
            found: state.version,
            expected: STATE_VERSION,
        });
    }

    let mut doc = StateDocument::new();
    if let Some(ts) = state.last_updated {
        doc.set_last_updated(ts);
    }
    doc.set_commit_hash(state.commit_hash);
    if let Some(args) = state.args {
        doc.set_args(args);
    }

    for (key, entry) in state.copied_files {
        check_key(&key)?;
        let delta = EditScript::decode(&entry.diff_delta)
            .map_err(|e| corrupted(format!("delta of '{key}': {e}")))?;
        doc.upsert_tracked(
            TrackedFile::new(key, entry.source, entry.last_updated)
                .with_permalink(entry.permalink)
                .with_remote_hash(ContentHash::parse_optional(&entry.remote_hash))
                .with_delta(delta)
                .with_ignored(entry.ignored),
        );
    }

    for (key, entry) in state.generated_files {
        check_key(&key)?;
        doc.upsert_generated(GeneratedFile::new(
            key,
            entry.reference_file,
            entry.last_updated,
        ));
    }

    for (key, entry) in state.archives {
        check_key(&key)?;
        doc.upsert_archive(ArchiveRecord::new(
            key,
            ContentHash::new(&entry.hash),
            entry.locator,
            entry.last_updated,
        ));
    }

    for (key, encoded) in state.blobs {
        let content =
            decompress_blob(&encoded).map_err(|e| corrupted(format!("blob of '{key}': {e}")))?;
        doc.set_blob(key, content);
    }

    for warning in state.warnings {
        doc.add_warning(warning);
    }

    Ok(doc)
}

/// Parse a serialized state document (exposed for fuzzing)
pub fn parse_state(content: &[u8], path: &Path) -> StateResult<StateDocument> {
    let state: JsonState = serde_json::from_slice(content).map_err(|e| StateError::Corrupted {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    from_json(state, path)
}

impl StateRepository for JsonStateRepository {
    fn load(&self, path: &Path) -> StateResult<StateDocument> {
        let content = self.fs.read(path).map_err(|e| StateError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::other(e.to_string()),
        })?;

        match content {
            None => {
                debug!(path = %path.display(), "no state file, starting fresh");
                Ok(StateDocument::new())
            }
            Some(bytes) => parse_state(&bytes, path),
        }
    }

    fn save(&self, doc: &StateDocument, path: &Path) -> StateResult<()> {
        let io_err = |e: std::io::Error| StateError::Io {
            path: path.to_path_buf(),
            source: e,
        };
        let fs_err = |e: crate::domain::ports::FsError| StateError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::other(e.to_string()),
        };

        let json = to_json(doc).map_err(io_err)?;
        let mut content = serde_json::to_vec_pretty(&json).map_err(|e| io_err(e.into()))?;
        content.push(b'\n');

        let _marker = SaveMarker::acquire(path)?;

        let backed_up = self.fs.backup(path).map_err(fs_err)?;
        match self.fs.write(path, &content) {
            Ok(()) => {
                if backed_up {
                    self.fs.discard_backup(path).map_err(fs_err)?;
                }
                debug!(path = %path.display(), files = doc.tracked_len(), "state saved");
                Ok(())
            }
            Err(e) => {
                if backed_up {
                    if let Err(restore_err) = self.fs.restore(path) {
                        warn!(error = %restore_err, "failed to restore previous state file");
                    }
                }
                Err(fs_err(e))
            }
        }
    }
}
