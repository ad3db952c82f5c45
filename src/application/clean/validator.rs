//! Consistency validator
//!
//! Recomputes digests and checks the destination tree against the state.
//! Issues are reported, never repaired.

use std::fmt;
use std::path::Path;

use crate::domain::entities::StateDocument;
use crate::domain::ports::FileSystem;
use crate::domain::value_objects::managed_name::{is_copy_name, is_safe_relative};
use crate::domain::value_objects::ContentHash;

/// One inconsistency between the state and the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    /// A recorded path does not follow the managed naming convention
    NamingViolation { path: String },
    /// A pristine tracked file is gone
    Missing { path: String },
    /// A pristine tracked file no longer matches its recorded digest
    DigestMismatch {
        path: String,
        expected: ContentHash,
        actual: ContentHash,
    },
    /// An archive differs from its recorded hash (or is gone)
    ArchiveMismatch {
        path: String,
        expected: ContentHash,
        actual: Option<ContentHash>,
    },
    /// The file could not be read
    Unreadable { path: String, message: String },
}

impl ValidationIssue {
    pub fn path(&self) -> &str {
        match self {
            ValidationIssue::NamingViolation { path }
            | ValidationIssue::Missing { path }
            | ValidationIssue::DigestMismatch { path, .. }
            | ValidationIssue::ArchiveMismatch { path, .. }
            | ValidationIssue::Unreadable { path, .. } => path,
        }
    }

    pub fn is_naming_violation(&self) -> bool {
        matches!(self, ValidationIssue::NamingViolation { .. })
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::NamingViolation { .. } => {
                write!(f, "not a managed file name")
            }
            ValidationIssue::Missing { .. } => write!(f, "missing"),
            ValidationIssue::DigestMismatch {
                expected, actual, ..
            } => write!(f, "digest mismatch (expected {expected}, found {actual})"),
            ValidationIssue::ArchiveMismatch {
                expected,
                actual: Some(actual),
                ..
            } => write!(f, "archive mismatch (expected {expected}, found {actual})"),
            ValidationIssue::ArchiveMismatch { actual: None, .. } => {
                write!(f, "archive missing")
            }
            ValidationIssue::Unreadable { message, .. } => write!(f, "unreadable: {message}"),
        }
    }
}

fn well_named(path: &str) -> bool {
    is_safe_relative(path) && is_copy_name(path)
}

/// Validate every record of `doc` against the tree under `root`
pub fn validate<FS>(doc: &StateDocument, fs: &FS, root: &Path) -> Vec<ValidationIssue>
where
    FS: FileSystem + ?Sized,
{
    let mut issues = Vec::new();

    let read = |path: &str, issues: &mut Vec<ValidationIssue>| match fs.read(&root.join(path)) {
        Ok(content) => Some(content),
        Err(e) => {
            issues.push(ValidationIssue::Unreadable {
                path: path.to_string(),
                message: e.to_string(),
            });
            None
        }
    };

    for file in doc.tracked_files() {
        let path = file.path();
        if !well_named(path) {
            issues.push(ValidationIssue::NamingViolation {
                path: path.to_string(),
            });
            continue;
        }
        if file.is_ignored() {
            continue;
        }
        let Some(content) = read(path, &mut issues) else {
            continue;
        };
        let customized = file.has_delta();

        match (content, file.remote_hash()) {
            (None, _) if !customized => issues.push(ValidationIssue::Missing {
                path: path.to_string(),
            }),
            (Some(bytes), Some(expected)) if !customized => {
                let actual = ContentHash::from_bytes(&bytes);
                if actual != *expected {
                    issues.push(ValidationIssue::DigestMismatch {
                        path: path.to_string(),
                        expected: expected.clone(),
                        actual,
                    });
                }
            }
            _ => {}
        }
    }

    for generated in doc.generated_files() {
        let path = generated.path();
        if !well_named(path) {
            issues.push(ValidationIssue::NamingViolation {
                path: path.to_string(),
            });
        } else if let Some(None) = read(path, &mut issues) {
            issues.push(ValidationIssue::Missing {
                path: path.to_string(),
            });
        }
    }

    for archive in doc.archives() {
        let path = archive.path();
        if !well_named(path) {
            issues.push(ValidationIssue::NamingViolation {
                path: path.to_string(),
            });
            continue;
        }
        let Some(content) = read(path, &mut issues) else {
            continue;
        };
        let actual = content.map(|bytes| ContentHash::from_bytes(&bytes));
        if actual.as_ref() != Some(archive.hash()) {
            issues.push(ValidationIssue::ArchiveMismatch {
                path: path.to_string(),
                expected: archive.hash().clone(),
                actual,
            });
        }
    }

    issues
}
