//! Sync and status result types

use crate::application::clean::CleanReport;
use crate::domain::services::FileStatus;

/// Outcome for one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    /// Destination path relative to the root
    pub path: String,
    pub status: FileStatus,
    /// Change regions of the recorded customization
    pub change_count: usize,
}

/// A per-file failure; the pass continues past it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub path: String,
    pub error: String,
}

/// Result of a sync pass
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    /// Classification of every processed file, in candidate order
    pub outcomes: Vec<FileOutcome>,
    /// Files whose content was written
    pub written: Vec<String>,
    /// Records dropped because the remote no longer lists them
    pub removed: Vec<String>,
    pub errors: Vec<FileFailure>,
    /// Nothing moved since the last pass; no file was examined
    pub up_to_date: bool,
    /// Cancellation interrupted the pass
    pub cancelled: bool,
    /// Remote fingerprint the pass ran against
    pub fingerprint: String,
    /// Validator and reaper outcome, when requested
    pub clean: Option<CleanReport>,
}

impl SyncReport {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
            && !self.cancelled
            && self.clean.as_ref().map_or(true, CleanReport::is_success)
    }

    pub fn count(&self, status: FileStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    pub fn outcome(&self, path: &str) -> Option<&FileOutcome> {
        self.outcomes.iter().find(|o| o.path == path)
    }
}

/// Result of a status query
#[derive(Debug, Clone, Default)]
pub struct StatusReport {
    /// Status of every tracked file
    pub outcomes: Vec<FileOutcome>,
    /// Managed-named files present on disk that the state does not know
    pub untracked: Vec<String>,
    /// Tracked files that could not be examined
    pub errors: Vec<FileFailure>,
    /// The recorded source arguments differ from the requested ones
    pub stale: bool,
}

impl StatusReport {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty() && !self.stale
    }

    pub fn count(&self, status: FileStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    pub fn outcome(&self, path: &str) -> Option<&FileOutcome> {
        self.outcomes.iter().find(|o| o.path == path)
    }
}
