//! Symlink-safe filesystem checks for the scratch directory.
//!
//! These use `symlink_metadata()` instead of `metadata()`, so a symlink
//! planted in the scratch tree (or inside an archive) is never followed
//! when locating the manifest or clearing a previous extraction.

use std::path::Path;

/// Returns `true` if the path is a regular file (not a symlink).
#[must_use]
pub(crate) fn is_regular_file(path: &Path) -> bool {
    path.symlink_metadata()
        .map(|m| m.file_type().is_file())
        .unwrap_or(false)
}

/// Returns `true` if the path is a regular directory (not a symlink).
#[must_use]
pub(crate) fn is_regular_dir(path: &Path) -> bool {
    path.symlink_metadata()
        .map(|m| m.file_type().is_dir())
        .unwrap_or(false)
}
