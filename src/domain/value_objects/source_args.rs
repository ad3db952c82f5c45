//! Source arguments value object
//!
//! Describes which remote subtree is mirrored and with which options. The
//! persisted copy of these arguments is compared against the current ones
//! to detect configuration drift: any difference forces a full pass.

use serde::{Deserialize, Serialize};

use super::ContentHash;

fn default_provider() -> String {
    "dir".to_string()
}

/// Options shaping the candidate set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyArgs {
    /// Only remote paths matching one of these patterns are mirrored (empty = all)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<String>,
    /// Remote paths matching these patterns are never mirrored
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
    /// Remote paths tracked in state but kept out of the live tree
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ignore: Vec<String>,
}

/// Options for the archive snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveArgs {
    #[serde(default)]
    pub enabled: bool,
    /// Base name of the archive artifact (defaults to `source`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ArchiveArgs {
    pub fn archive_name(&self) -> &str {
        self.name.as_deref().unwrap_or("source")
    }
}

/// Repository identity, ref, subpath, and options used for a sync
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceArgs {
    /// Name of the provider in the registry
    #[serde(default = "default_provider")]
    pub provider: String,
    pub src_repo: String,
    #[serde(default)]
    pub src_ref: String,
    #[serde(default)]
    pub src_path: String,
    #[serde(default)]
    pub copy_args: CopyArgs,
    #[serde(default)]
    pub archive_args: ArchiveArgs,
}

impl SourceArgs {
    pub fn new(provider: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            src_repo: repo.into(),
            src_ref: String::new(),
            src_path: String::new(),
            copy_args: CopyArgs::default(),
            archive_args: ArchiveArgs::default(),
        }
    }

    pub fn with_ref(mut self, reference: impl Into<String>) -> Self {
        self.src_ref = reference.into();
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.src_path = path.into();
        self
    }

    pub fn with_copy_args(mut self, copy_args: CopyArgs) -> Self {
        self.copy_args = copy_args;
        self
    }

    pub fn with_archive_args(mut self, archive_args: ArchiveArgs) -> Self {
        self.archive_args = archive_args;
        self
    }

    /// Hash of every field; two argument sets with the same fingerprint
    /// produce the same candidate set for the same remote version.
    pub fn fingerprint(&self) -> ContentHash {
        // Struct serialization order is fixed by field declaration order.
        let canonical = serde_json::to_vec(self).unwrap_or_default();
        ContentHash::from_bytes(&canonical)
    }
}
