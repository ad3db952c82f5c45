//! Orphan detection
//!
//! Decides which files in the destination tree are no longer owned by the
//! state. Only names following the managed naming convention (and leftover
//! temporary files) are ever candidates; everything else belongs to the user.

use std::collections::BTreeSet;

use crate::domain::entities::StateDocument;
use crate::domain::value_objects::managed_name::{is_managed, is_temp_name, overlay_path};

/// Files the state currently owns
pub fn referenced_paths(doc: &StateDocument) -> BTreeSet<String> {
    let mut referenced = BTreeSet::new();

    for file in doc.tracked_files() {
        if !file.is_ignored() {
            referenced.insert(file.path().to_string());
        }
        if file.has_delta() {
            if let Some(overlay) = overlay_path(file.path()) {
                referenced.insert(overlay);
            }
        }
    }
    referenced.extend(doc.generated_files().map(|g| g.path().to_string()));
    referenced.extend(doc.archives().map(|a| a.path().to_string()));

    referenced
}

/// Files to delete from the destination tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrphanDetectionResult {
    /// Managed-named files no longer referenced
    pub orphans: Vec<String>,
    /// Leftover temporary files of interrupted writes
    pub temp_files: Vec<String>,
    /// Live copies of ignored entries
    pub ignored: Vec<String>,
}

impl OrphanDetectionResult {
    pub fn is_empty(&self) -> bool {
        self.orphans.is_empty() && self.temp_files.is_empty() && self.ignored.is_empty()
    }

    /// Every path to delete, in a stable order
    pub fn all(&self) -> impl Iterator<Item = &str> {
        self.orphans
            .iter()
            .chain(&self.temp_files)
            .chain(&self.ignored)
            .map(String::as_str)
    }
}

pub struct OrphanDetector;

impl OrphanDetector {
    /// Classify the relative `/`-separated paths present on disk
    pub fn detect<'a>(
        doc: &StateDocument,
        on_disk: impl IntoIterator<Item = &'a str>,
    ) -> OrphanDetectionResult {
        let referenced = referenced_paths(doc);
        let mut result = OrphanDetectionResult::default();

        for path in on_disk {
            if is_temp_name(path) {
                result.temp_files.push(path.to_string());
            } else if doc.tracked(path).is_some_and(|f| f.is_ignored()) {
                result.ignored.push(path.to_string());
            } else if is_managed(path) && !referenced.contains(path) {
                result.orphans.push(path.to_string());
            }
        }

        result.orphans.sort();
        result.temp_files.sort();
        result.ignored.sort();
        result
    }
}
