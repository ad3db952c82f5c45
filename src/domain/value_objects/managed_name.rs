//! Managed file naming convention
//!
//! Every artifact keepsync writes into the destination tree carries a marker
//! in its file name so the validator and the orphan reaper can recognize
//! ownership without consulting file content:
//!
//! - pristine mirror: `<base>.copy.<ext>` (or `<name>.copy` without extension)
//! - customized overlay: `<base>.patch.<ext>` (or `<name>.patch`)
//!
//! Paths handled here are always relative, `/`-separated destination paths.

use std::path::{Component, Path};

/// Marker for pristine mirrored content
pub const COPY_MARKER: &str = "copy";

/// Marker for customized overlays
pub const PATCH_MARKER: &str = "patch";

/// Prefix of temporary files created by the atomic writer
pub const TEMP_PREFIX: &str = ".keepsync-";

/// Suffix of temporary files created by the atomic writer
pub const TEMP_SUFFIX: &str = ".tmp";

/// Suffix appended to a file name when it is backed up
pub const BACKUP_SUFFIX: &str = ".keepsync-bak";

/// Normalize a path for state storage (always use forward slashes).
pub fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Check that a relative path stays inside the destination root.
pub fn is_safe_relative(path: &str) -> bool {
    if path.is_empty() {
        return false;
    }
    Path::new(path)
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

fn split_name(path: &str) -> (&str, &str) {
    match path.rfind('/') {
        Some(idx) => (&path[..=idx], &path[idx + 1..]),
        None => ("", path),
    }
}

/// Split a file name into `(base, ext)`; a leading dot is part of the base.
fn split_ext(name: &str) -> (&str, Option<&str>) {
    match name.rfind('.') {
        Some(0) | None => (name, None),
        Some(idx) => (&name[..idx], Some(&name[idx + 1..])),
    }
}

fn with_marker(path: &str, marker: &str) -> String {
    let (dir, name) = split_name(path);
    match split_ext(name) {
        (base, Some(ext)) => format!("{dir}{base}.{marker}.{ext}"),
        (base, None) => format!("{dir}{base}.{marker}"),
    }
}

/// Destination path of the pristine mirror for a remote relative path.
///
/// `src/lib.rs` becomes `src/lib.copy.rs`, `Makefile` becomes `Makefile.copy`.
pub fn copy_path(remote_path: &str) -> String {
    with_marker(remote_path, COPY_MARKER)
}

/// Overlay path derived from a pristine mirror path.
///
/// Returns `None` if `copy_path` does not carry the copy marker.
pub fn overlay_path(copy_path: &str) -> Option<String> {
    let (dir, name) = split_name(copy_path);
    let infix = format!(".{COPY_MARKER}.");
    let suffix = format!(".{COPY_MARKER}");
    if let Some(idx) = name.rfind(&infix) {
        let replaced = format!(
            "{}.{PATCH_MARKER}.{}",
            &name[..idx],
            &name[idx + infix.len()..]
        );
        Some(format!("{dir}{replaced}"))
    } else {
        name.strip_suffix(&suffix)
            .map(|base| format!("{dir}{base}.{PATCH_MARKER}"))
    }
}

fn has_marker(name: &str, marker: &str) -> bool {
    name.contains(&format!(".{marker}.")) || name.ends_with(&format!(".{marker}"))
}

/// Whether the file name carries the pristine mirror marker
pub fn is_copy_name(path: &str) -> bool {
    has_marker(split_name(path).1, COPY_MARKER)
}

/// Whether the file name carries the overlay marker
pub fn is_overlay_name(path: &str) -> bool {
    has_marker(split_name(path).1, PATCH_MARKER)
}

/// Whether the file name follows the managed naming convention
pub fn is_managed(path: &str) -> bool {
    is_copy_name(path) || is_overlay_name(path)
}

/// Whether the file name is a leftover temporary file from the atomic writer
pub fn is_temp_name(path: &str) -> bool {
    let name = split_name(path).1;
    name.starts_with(TEMP_PREFIX) && name.ends_with(TEMP_SUFFIX)
}
