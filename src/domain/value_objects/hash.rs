//! Content Hash Value Object
//!
//! A validated, immutable hash representing the content of a file.
//! Used for change detection and customization tracking.

use std::fmt;

use sha2::{Digest, Sha256};

/// Content hash value object
///
/// Wraps a SHA-256 hash string with the `sha256:` prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentHash(String);

impl ContentHash {
    /// Prefix for SHA-256 hashes
    pub const PREFIX: &'static str = "sha256:";

    /// Create a new ContentHash from a hash string (with or without prefix)
    pub fn new(raw_hash: &str) -> Self {
        if raw_hash.starts_with(Self::PREFIX) {
            Self(raw_hash.to_string())
        } else {
            Self(format!("{}{}", Self::PREFIX, raw_hash))
        }
    }

    /// Create a ContentHash by computing SHA-256 of raw bytes
    pub fn from_bytes(content: &[u8]) -> Self {
        let hash = Sha256::digest(content);
        Self(format!("{}{:x}", Self::PREFIX, hash))
    }

    /// Parse a persisted hash; empty strings mean "no digest recorded"
    pub fn parse_optional(s: &str) -> Option<Self> {
        if s.trim().is_empty() {
            None
        } else {
            Some(Self::new(s.trim()))
        }
    }

    /// Get the full hash string with prefix
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get just the hex part without prefix
    pub fn hex(&self) -> &str {
        self.0.strip_prefix(Self::PREFIX).unwrap_or(&self.0)
    }

    /// Check if this hash is the digest of `content`
    pub fn matches_content(&self, content: &[u8]) -> bool {
        *self == Self::from_bytes(content)
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ContentHash {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for ContentHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
