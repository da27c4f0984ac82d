//! Path normalization utilities
//!
//! Citations are knowledge-root-relative paths using '/' as separator, so
//! the same knowledge directory produces identical labels on any platform.

use std::path::Path;

/// Normalize a path to use '/' as separator (for cross-platform consistency)
pub fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Make a path relative to the knowledge root
pub fn make_relative(path: &Path, root: &Path) -> Option<String> {
    path.strip_prefix(root).ok().map(normalize_path)
}
