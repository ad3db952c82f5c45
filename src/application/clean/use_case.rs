//! Clean Use Case
//!
//! Validates the destination tree against the state, then reaps orphans:
//! managed-named files the state no longer references, leftover temporary
//! files, and live copies of ignored entries. Directories emptied by a
//! removal are pruned up to the root. Nothing is fetched and the state is
//! not modified.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::entities::StateDocument;
use crate::domain::ports::{FileSystem, NoopEventSink, StateRepository, SyncEvent, SyncEventSink};
use crate::domain::services::OrphanDetector;
use crate::domain::value_objects::managed_name::normalize_path;
use crate::error::{KeepsyncError, KeepsyncResult};
use crate::infrastructure::repositories::STATE_FILE_NAME;

use super::result::CleanReport;
use super::validator::validate;

pub struct CleanUseCase<SR, FS>
where
    SR: StateRepository,
    FS: FileSystem,
{
    state_repo: SR,
    fs: FS,
    events: Arc<dyn SyncEventSink>,
}

impl<SR, FS> CleanUseCase<SR, FS>
where
    SR: StateRepository,
    FS: FileSystem,
{
    pub fn new(state_repo: SR, fs: FS) -> Self {
        Self {
            state_repo,
            fs,
            events: Arc::new(NoopEventSink),
        }
    }

    pub fn with_events(mut self, events: Arc<dyn SyncEventSink>) -> Self {
        self.events = events;
        self
    }

    /// Load the state of `destination` and clean it
    pub fn execute(&self, destination: &Path) -> KeepsyncResult<CleanReport> {
        clean_destination(&self.state_repo, &self.fs, destination, self.events.as_ref())
    }
}

/// Standalone clean request: load the state, then validate and reap,
/// bracketed by `Started` and `Completed` events
#[tracing::instrument(skip_all, fields(destination = %destination.display()))]
pub(crate) fn clean_destination<SR, FS>(
    state_repo: &SR,
    fs: &FS,
    destination: &Path,
    events: &dyn SyncEventSink,
) -> KeepsyncResult<CleanReport>
where
    SR: StateRepository + ?Sized,
    FS: FileSystem + ?Sized,
{
    let doc = state_repo.load(&destination.join(STATE_FILE_NAME))?;
    events.on_event(SyncEvent::Started {
        command: "clean",
        destination: destination.display().to_string(),
        provider: String::new(),
    });
    let report = clean_tree(&doc, fs, destination, events)?;
    events.on_event(SyncEvent::Completed {
        command: "clean",
        written: 0,
        removed: 0,
        deleted: report.deleted.len(),
        errors: report.errors.len() + report.issues.len(),
    });
    Ok(report)
}

/// Validate `doc` against `root`, then reap.
///
/// A naming violation aborts before anything is deleted.
pub(crate) fn clean_tree<FS>(
    doc: &StateDocument,
    fs: &FS,
    root: &Path,
    events: &dyn SyncEventSink,
) -> KeepsyncResult<CleanReport>
where
    FS: FileSystem + ?Sized,
{
    let mut report = CleanReport::new();

    report.issues = validate(doc, fs, root);
    for issue in &report.issues {
        warn!(path = issue.path(), %issue, "validation failed");
        events.on_event(SyncEvent::ValidationFailed {
            path: issue.path().to_string(),
            issue: issue.to_string(),
        });
    }
    if let Some(violation) = report.issues.iter().find(|i| i.is_naming_violation()) {
        return Err(KeepsyncError::NamingViolation {
            path: violation.path().to_string(),
        });
    }

    let on_disk: Vec<String> = fs
        .list_files(root)?
        .iter()
        .map(|p| normalize_path(p))
        .collect();
    let detection = OrphanDetector::detect(doc, on_disk.iter().map(String::as_str));
    debug!(
        orphans = detection.orphans.len(),
        temp_files = detection.temp_files.len(),
        ignored = detection.ignored.len(),
        "orphan detection complete"
    );

    for path in detection.all() {
        let absolute = root.join(path);
        match fs.remove(&absolute) {
            Ok(()) => {
                events.on_event(SyncEvent::OrphanDeleted {
                    path: path.to_string(),
                });
                report.deleted.push(path.to_string());
            }
            Err(e) => {
                events.on_event(SyncEvent::FileError {
                    path: path.to_string(),
                    error: e.to_string(),
                });
                report.errors.push(format!("{path}: {e}"));
                continue;
            }
        }
        match fs.prune_empty_parents(root, &absolute) {
            Ok(dirs) if !dirs.is_empty() => {
                debug!(%path, count = dirs.len(), "pruned empty directories")
            }
            Ok(_) => {}
            Err(e) => report.errors.push(e.to_string()),
        }
    }

    info!(
        issues = report.issues.len(),
        deleted = report.deleted.len(),
        errors = report.errors.len(),
        "clean complete"
    );
    Ok(report)
}
