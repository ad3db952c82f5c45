//! Copy filter value object
//!
//! Compiles the include/exclude/ignore pattern lists of [`CopyArgs`] into
//! gitignore-style matchers using the `ignore` crate.

use std::path::Path;

use ignore::gitignore::{Gitignore, GitignoreBuilder};

use super::CopyArgs;
use crate::error::{KeepsyncError, KeepsyncResult};

/// How a remote path participates in a sync
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Not part of the candidate set
    Skipped,
    /// Mirrored into the live tree
    Mirrored,
    /// Tracked in state only; kept out of the live tree
    Ignored,
}

/// Compiled matchers for one [`CopyArgs`]
#[derive(Debug)]
pub struct CopyFilter {
    include: Option<Gitignore>,
    exclude: Option<Gitignore>,
    ignore: Option<Gitignore>,
}

fn build(patterns: &[String]) -> KeepsyncResult<Option<Gitignore>> {
    if patterns.is_empty() {
        return Ok(None);
    }

    let mut builder = GitignoreBuilder::new("");
    for pattern in patterns {
        builder
            .add_line(None, pattern)
            .map_err(|e| KeepsyncError::InvalidPattern {
                pattern: pattern.clone(),
                message: e.to_string(),
            })?;
    }
    let matcher = builder.build().map_err(|e| KeepsyncError::InvalidPattern {
        pattern: patterns.join(", "),
        message: e.to_string(),
    })?;
    Ok(Some(matcher))
}

fn matches(matcher: &Option<Gitignore>, path: &str) -> bool {
    matcher
        .as_ref()
        .map(|m| m.matched_path_or_any_parents(Path::new(path), false).is_ignore())
        .unwrap_or(false)
}

impl CopyFilter {
    pub fn new(args: &CopyArgs) -> KeepsyncResult<Self> {
        Ok(Self {
            include: build(&args.include)?,
            exclude: build(&args.exclude)?,
            ignore: build(&args.ignore)?,
        })
    }

    /// A filter that mirrors everything
    pub fn all() -> Self {
        Self {
            include: None,
            exclude: None,
            ignore: None,
        }
    }

    /// Decide how a remote relative path is handled
    pub fn select(&self, path: &str) -> Selection {
        if self.include.is_some() && !matches(&self.include, path) {
            return Selection::Skipped;
        }
        if matches(&self.exclude, path) {
            return Selection::Skipped;
        }
        if matches(&self.ignore, path) {
            return Selection::Ignored;
        }
        Selection::Mirrored
    }
}
