//! Sync Event Port
//!
//! Observable interface for sync, status and clean passes. Sinks render the
//! events for humans or as an NDJSON stream for automation.

use crate::domain::services::FileStatus;

/// Event emitted during a pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// Pass started
    Started {
        command: &'static str,
        destination: String,
        provider: String,
    },

    /// One file was classified
    FileClassified {
        path: String,
        status: FileStatus,
        change_count: usize,
    },

    /// One file failed; the pass continues
    FileError { path: String, error: String },

    /// A record was dropped because the remote no longer lists it
    FileRemoved { path: String },

    /// A managed file no longer referenced by the state was deleted
    OrphanDeleted { path: String },

    /// The validator found an inconsistency
    ValidationFailed { path: String, issue: String },

    /// Nothing changed since the last pass
    UpToDate { fingerprint: String },

    /// Pass completed
    Completed {
        command: &'static str,
        written: usize,
        removed: usize,
        deleted: usize,
        errors: usize,
    },
}

/// Trait for receiving sync events
pub trait SyncEventSink: Send + Sync {
    fn on_event(&self, event: SyncEvent);
}

/// Silent sink
pub struct NoopEventSink;

impl SyncEventSink for NoopEventSink {
    fn on_event(&self, _event: SyncEvent) {}
}
