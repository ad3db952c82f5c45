//! Clean result types

use super::validator::ValidationIssue;

/// Result of a validate-and-reap pass
#[derive(Debug, Clone, Default)]
pub struct CleanReport {
    /// Inconsistencies found by the validator
    pub issues: Vec<ValidationIssue>,
    /// Files deleted by the reaper (relative paths)
    pub deleted: Vec<String>,
    /// Deletions that failed
    pub errors: Vec<String>,
}

impl CleanReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// No failed deletion and no consistency violation
    pub fn is_success(&self) -> bool {
        self.errors.is_empty() && self.issues.is_empty()
    }

    pub fn is_consistent(&self) -> bool {
        self.issues.is_empty()
    }
}
