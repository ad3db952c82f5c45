//! File status classifier
//!
//! The single decision point reconciling three views of a file: what is on
//! disk, what the state recorded, and what the remote currently serves. It
//! is pure; the orchestrator performs the write and record mutation it
//! decides on.

use std::fmt;

use thiserror::Error;

use super::differ::{Differ, EditScript};
use crate::domain::entities::TrackedFile;
use crate::domain::value_objects::ContentHash;

/// Outcome of classifying one file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileStatus {
    /// Never seen before; written
    New,
    /// Local content matches the remote
    Unchanged,
    /// Remote changed and the local copy was pristine; overwritten
    Modified,
    /// Local edits present; never overwritten
    Customized,
    /// Present locally but not managed by keepsync
    Untracked,
    /// Tracked but missing on disk
    Deleted,
    /// Tracked in state only, kept out of the live tree
    Ignored,
}

impl FileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileStatus::New => "new",
            FileStatus::Unchanged => "unchanged",
            FileStatus::Modified => "modified",
            FileStatus::Customized => "customized",
            FileStatus::Untracked => "untracked",
            FileStatus::Deleted => "deleted",
            FileStatus::Ignored => "ignored",
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// How the tracked record should change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordChange {
    /// Leave the record as it is
    Keep,
    /// Refresh the record timestamp only
    Touch,
    /// Create or update the record with this digest and delta
    Track {
        remote_hash: ContentHash,
        delta: EditScript,
    },
}

/// Decision for one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub status: FileStatus,
    /// Whether the incoming content must be written to the destination
    pub write: bool,
    pub change: RecordChange,
}

impl Classification {
    fn status_only(status: FileStatus) -> Self {
        Self {
            status,
            write: false,
            change: RecordChange::Keep,
        }
    }

    /// Number of change regions in the delta this classification records
    pub fn change_count(&self) -> usize {
        match &self.change {
            RecordChange::Track { delta, .. } => delta.change_count(),
            _ => 0,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClassifyError {
    #[error("no remote content available for a file with no prior record")]
    MissingContent,
}

/// Inputs of one classification
#[derive(Debug, Clone, Copy)]
pub struct ClassifyInput<'a> {
    pub on_disk: Option<&'a [u8]>,
    pub record: Option<&'a TrackedFile>,
    pub incoming: Option<&'a [u8]>,
    /// Whether the destination path carries a managed naming marker
    pub managed_name: bool,
}

/// Classify a file. Rules are evaluated in order; the first match wins.
pub fn classify(input: ClassifyInput<'_>) -> Result<Classification, ClassifyError> {
    let ClassifyInput {
        on_disk,
        record,
        incoming,
        managed_name,
    } = input;

    let Some(record) = record else {
        return classify_unrecorded(on_disk, incoming, managed_name);
    };

    let disk_hash = ContentHash::from_bytes(on_disk.unwrap_or_default());
    let diverged =
        record.remote_hash().is_some_and(|h| *h != disk_hash) || record.has_delta();

    let Some(incoming) = incoming else {
        let status = match on_disk {
            None => FileStatus::Deleted,
            Some(_) if diverged => FileStatus::Customized,
            Some(_) => FileStatus::Unchanged,
        };
        return Ok(Classification::status_only(status));
    };

    let incoming_hash = ContentHash::from_bytes(incoming);

    if diverged {
        let delta = Differ::new().diff(incoming, on_disk.unwrap_or_default());
        let status = match on_disk {
            None => FileStatus::Deleted,
            Some(_) if delta.is_empty() => FileStatus::Unchanged,
            Some(_) => FileStatus::Customized,
        };
        return Ok(Classification {
            status,
            write: false,
            change: RecordChange::Track {
                remote_hash: incoming_hash,
                delta,
            },
        });
    }

    if on_disk.is_some() && disk_hash == incoming_hash {
        return Ok(Classification {
            status: FileStatus::Unchanged,
            write: false,
            change: RecordChange::Touch,
        });
    }

    Ok(Classification {
        status: FileStatus::Modified,
        write: true,
        change: RecordChange::Track {
            remote_hash: incoming_hash,
            delta: EditScript::empty(),
        },
    })
}

fn classify_unrecorded(
    on_disk: Option<&[u8]>,
    incoming: Option<&[u8]>,
    managed_name: bool,
) -> Result<Classification, ClassifyError> {
    match (on_disk, incoming) {
        (Some(_), _) if !managed_name => Ok(Classification::status_only(FileStatus::Untracked)),
        (None, None) => Err(ClassifyError::MissingContent),
        (None, Some(incoming)) => Ok(Classification {
            status: FileStatus::New,
            write: true,
            change: RecordChange::Track {
                remote_hash: ContentHash::from_bytes(incoming),
                delta: EditScript::empty(),
            },
        }),
        // Managed-named file with no record and nothing to compare against
        (Some(_), None) => Ok(Classification::status_only(FileStatus::Untracked)),
        // Adoption of a managed-named file left without a record
        (Some(existing), Some(incoming)) => Ok(Classification {
            status: FileStatus::Modified,
            write: existing != incoming,
            change: RecordChange::Track {
                remote_hash: ContentHash::from_bytes(incoming),
                delta: EditScript::empty(),
            },
        }),
    }
}
