//! Differ Domain Service
//!
//! Computes reversible, line-based edit scripts between two byte strings.
//! Customized files record the script that turns the latest remote content
//! into what is on disk; the script is informational and never applied
//! automatically.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use similar::{capture_diff_slices, Algorithm, DiffOp, TextDiff};
use thiserror::Error;

/// Errors produced while decoding or applying an edit script
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeltaError {
    #[error("invalid edit operation on line {line}: '{text}'")]
    InvalidOp { line: usize, text: String },

    #[error("invalid line payload on line {line}: {message}")]
    InvalidPayload { line: usize, message: String },

    #[error("edit script does not match input at line {line}")]
    Mismatch { line: usize },
}

/// One edit operation, in line units
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOp {
    /// Copy the next `n` lines unchanged
    Keep(usize),
    /// Remove these lines (kept so the script can be inverted)
    Delete(Vec<Vec<u8>>),
    /// Add these lines
    Insert(Vec<Vec<u8>>),
}

/// A contiguous region of changes, with 1-based line numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeRegion {
    pub old_start: usize,
    pub old_lines: usize,
    pub new_start: usize,
    pub new_lines: usize,
}

impl std::fmt::Display for ChangeRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "@@ -{},{} +{},{} @@",
            self.old_start, self.old_lines, self.new_start, self.new_lines
        )
    }
}

/// Reversible edit script from an `old` to a `new` byte string
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditScript {
    ops: Vec<EditOp>,
}

fn split_lines(content: &[u8]) -> Vec<&[u8]> {
    content.split_inclusive(|b| *b == b'\n').collect()
}

impl EditScript {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[EditOp] {
        &self.ops
    }

    /// True when the script describes no change
    pub fn is_empty(&self) -> bool {
        self.ops.iter().all(|op| matches!(op, EditOp::Keep(_)))
    }

    fn push(&mut self, op: EditOp) {
        // Keep counts from `diff` are bounded by the input length.
        let _ = self.try_push(op);
    }

    /// Append `op`, merging with the previous op of the same kind.
    /// Returns `None` when merged keep counts would overflow.
    fn try_push(&mut self, op: EditOp) -> Option<()> {
        match (self.ops.last_mut(), op) {
            (Some(EditOp::Keep(n)), EditOp::Keep(m)) => *n = n.checked_add(m)?,
            (Some(EditOp::Delete(a)), EditOp::Delete(b)) => a.extend(b),
            (Some(EditOp::Insert(a)), EditOp::Insert(b)) => a.extend(b),
            (_, EditOp::Keep(0)) => {}
            (_, op) => self.ops.push(op),
        }
        Some(())
    }

    /// Contiguous change regions, in order
    pub fn regions(&self) -> Vec<ChangeRegion> {
        let mut regions = Vec::new();
        let mut old_pos = 0;
        let mut new_pos = 0;
        let mut current: Option<ChangeRegion> = None;

        for op in &self.ops {
            match op {
                EditOp::Keep(n) => {
                    if let Some(region) = current.take() {
                        regions.push(region);
                    }
                    old_pos += n;
                    new_pos += n;
                }
                EditOp::Delete(lines) => {
                    let region = current.get_or_insert(ChangeRegion {
                        old_start: old_pos + 1,
                        old_lines: 0,
                        new_start: new_pos + 1,
                        new_lines: 0,
                    });
                    region.old_lines += lines.len();
                    old_pos += lines.len();
                }
                EditOp::Insert(lines) => {
                    let region = current.get_or_insert(ChangeRegion {
                        old_start: old_pos + 1,
                        old_lines: 0,
                        new_start: new_pos + 1,
                        new_lines: 0,
                    });
                    region.new_lines += lines.len();
                    new_pos += lines.len();
                }
            }
        }
        if let Some(region) = current {
            regions.push(region);
        }
        regions
    }

    /// Number of discrete change regions
    pub fn change_count(&self) -> usize {
        self.regions().len()
    }

    /// Script that undoes this one
    pub fn invert(&self) -> Self {
        let mut inverted = Self::empty();
        for op in &self.ops {
            inverted.push(match op {
                EditOp::Keep(n) => EditOp::Keep(*n),
                EditOp::Delete(lines) => EditOp::Insert(lines.clone()),
                EditOp::Insert(lines) => EditOp::Delete(lines.clone()),
            });
        }
        inverted
    }

    /// Apply the script to `old`, producing `new`
    pub fn apply(&self, old: &[u8]) -> Result<Vec<u8>, DeltaError> {
        let lines = split_lines(old);
        let mut cursor: usize = 0;
        let mut out = Vec::with_capacity(old.len());

        for op in &self.ops {
            match op {
                EditOp::Keep(n) => {
                    let end = match cursor.checked_add(*n) {
                        Some(end) if end <= lines.len() => end,
                        _ => return Err(DeltaError::Mismatch { line: cursor + 1 }),
                    };
                    for line in &lines[cursor..end] {
                        out.extend_from_slice(line);
                    }
                    cursor = end;
                }
                EditOp::Delete(expected) => {
                    for line in expected {
                        if lines.get(cursor) != Some(&line.as_slice()) {
                            return Err(DeltaError::Mismatch { line: cursor + 1 });
                        }
                        cursor += 1;
                    }
                }
                EditOp::Insert(added) => {
                    for line in added {
                        out.extend_from_slice(line);
                    }
                }
            }
        }

        if cursor != lines.len() {
            return Err(DeltaError::Mismatch { line: cursor + 1 });
        }
        Ok(out)
    }

    /// Compact textual encoding: one op per line (`=N`, `-<b64>`, `+<b64>`)
    pub fn encode(&self) -> String {
        if self.is_empty() {
            return String::new();
        }
        let mut out: Vec<String> = Vec::new();
        for op in &self.ops {
            match op {
                EditOp::Keep(n) => out.push(format!("={n}")),
                EditOp::Delete(lines) => {
                    out.extend(lines.iter().map(|l| format!("-{}", STANDARD.encode(l))))
                }
                EditOp::Insert(lines) => {
                    out.extend(lines.iter().map(|l| format!("+{}", STANDARD.encode(l))))
                }
            }
        }
        out.join("\n")
    }

    /// Parse the output of [`EditScript::encode`]
    pub fn decode(encoded: &str) -> Result<Self, DeltaError> {
        let mut script = Self::empty();
        for (idx, text) in encoded.lines().enumerate() {
            let line = idx + 1;
            if text.is_empty() {
                continue;
            }
            let invalid = || DeltaError::InvalidOp {
                line,
                text: text.to_string(),
            };
            let mut chars = text.chars();
            let tag = chars.next().ok_or_else(invalid)?;
            let payload = chars.as_str();
            let bytes = || {
                STANDARD
                    .decode(payload)
                    .map_err(|e| DeltaError::InvalidPayload {
                        line,
                        message: e.to_string(),
                    })
            };
            let op = match tag {
                '=' => EditOp::Keep(payload.parse().map_err(|_| invalid())?),
                '-' => EditOp::Delete(vec![bytes()?]),
                '+' => EditOp::Insert(vec![bytes()?]),
                _ => return Err(invalid()),
            };
            script.try_push(op).ok_or_else(invalid)?;
        }
        Ok(script)
    }
}

/// Differ service for computing edit scripts
#[derive(Debug, Clone, Copy, Default)]
pub struct Differ;

impl Differ {
    pub fn new() -> Self {
        Self
    }

    /// Compute the edit script turning `old` into `new`
    pub fn diff(&self, old: &[u8], new: &[u8]) -> EditScript {
        let old_lines = split_lines(old);
        let new_lines = split_lines(new);
        let mut script = EditScript::empty();

        for op in capture_diff_slices(Algorithm::Myers, &old_lines, &new_lines) {
            match op {
                DiffOp::Equal { len, .. } => script.push(EditOp::Keep(len)),
                DiffOp::Delete {
                    old_index, old_len, ..
                } => script.push(EditOp::Delete(to_owned(
                    &old_lines[old_index..old_index + old_len],
                ))),
                DiffOp::Insert {
                    new_index, new_len, ..
                } => script.push(EditOp::Insert(to_owned(
                    &new_lines[new_index..new_index + new_len],
                ))),
                DiffOp::Replace {
                    old_index,
                    old_len,
                    new_index,
                    new_len,
                } => {
                    script.push(EditOp::Delete(to_owned(
                        &old_lines[old_index..old_index + old_len],
                    )));
                    script.push(EditOp::Insert(to_owned(
                        &new_lines[new_index..new_index + new_len],
                    )));
                }
            }
        }
        script
    }

    /// Human-readable unified diff (lossy for non-UTF-8 content)
    pub fn unified(&self, old: &[u8], new: &[u8], old_label: &str, new_label: &str) -> String {
        let old = String::from_utf8_lossy(old);
        let new = String::from_utf8_lossy(new);
        TextDiff::from_lines(old.as_ref(), new.as_ref())
            .unified_diff()
            .context_radius(3)
            .header(old_label, new_label)
            .to_string()
    }
}

fn to_owned(lines: &[&[u8]]) -> Vec<Vec<u8>> {
    lines.iter().map(|l| l.to_vec()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_inputs_produce_empty_script() {
        let script = Differ::new().diff(b"a\nb\n", b"a\nb\n");
        assert!(script.is_empty());
        assert_eq!(script.change_count(), 0);
    }

    #[test]
    fn single_line_change_is_one_region() {
        let script = Differ::new().diff(b"hello!", b"hello world");
        assert_eq!(script.change_count(), 1);
        assert_eq!(
            script.regions()[0],
            ChangeRegion {
                old_start: 1,
                old_lines: 1,
                new_start: 1,
                new_lines: 1
            }
        );
    }

    #[test]
    fn separated_changes_are_separate_regions() {
        let old = b"a\nb\nc\nd\ne\n";
        let new = b"A\nb\nc\nd\nE\n";
        let script = Differ::new().diff(old, new);
        assert_eq!(script.change_count(), 2);
        assert_eq!(script.regions()[1].old_start, 5);
    }

    #[test]
    fn apply_and_invert_round_trip() {
        let old = b"one\ntwo\nthree\n";
        let new = b"one\n2\nthree\nfour\n";
        let script = Differ::new().diff(old, new);
        assert_eq!(script.apply(old).unwrap(), new.to_vec());
        assert_eq!(script.invert().apply(new).unwrap(), old.to_vec());
    }

    #[test]
    fn works_on_non_utf8_bytes() {
        let old = [0xff, 0xfe, b'\n', 0x00];
        let new = [0xff, 0xfe, b'\n', 0x01];
        let script = Differ::new().diff(&old, &new);
        assert_eq!(script.apply(&old).unwrap(), new.to_vec());
    }

    #[test]
    fn encode_decode_preserves_script() {
        let script = Differ::new().diff(b"x\ny\n", b"x\nz\n");
        let encoded = script.encode();
        assert!(encoded.starts_with("=1\n-"));
        assert_eq!(EditScript::decode(&encoded).unwrap(), script);
    }

    #[test]
    fn empty_script_encodes_to_empty_string() {
        assert_eq!(EditScript::empty().encode(), "");
        assert!(EditScript::decode("").unwrap().is_empty());
    }

    #[test]
    fn decode_rejects_unknown_ops() {
        let err = EditScript::decode("=1\n?abc").unwrap_err();
        assert!(matches!(err, DeltaError::InvalidOp { line: 2, .. }));
    }

    #[test]
    fn decode_rejects_multibyte_tag() {
        let err = EditScript::decode("é").unwrap_err();
        assert!(matches!(err, DeltaError::InvalidOp { line: 1, .. }));
    }

    #[test]
    fn decode_rejects_overflowing_keep_counts() {
        let err = EditScript::decode(&format!("={}\n=1", usize::MAX)).unwrap_err();
        assert!(matches!(err, DeltaError::InvalidOp { line: 2, .. }));
    }

    #[test]
    fn apply_rejects_oversized_keep() {
        let script = EditScript::decode(&format!("=1\n+YQo=\n={}", usize::MAX)).unwrap();
        assert!(matches!(
            script.apply(b"x\n"),
            Err(DeltaError::Mismatch { .. })
        ));
    }

    #[test]
    fn keep_only_script_encodes_to_empty_string() {
        let script = Differ::new().diff(b"one\nTWO\n", b"one\nTWO\n");
        assert_eq!(script.encode(), "");
    }

    #[test]
    fn apply_detects_mismatched_input() {
        let script = Differ::new().diff(b"a\n", b"b\n");
        assert!(script.apply(b"c\n").is_err());
    }

    #[test]
    fn unified_diff_has_headers() {
        let text = Differ::new().unified(b"a\n", b"b\n", "remote", "local");
        assert!(text.contains("--- remote"));
        assert!(text.contains("+++ local"));
        assert!(text.contains("-a"));
        assert!(text.contains("+b"));
    }
}
