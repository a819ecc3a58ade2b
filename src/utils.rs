/*!
 * Utility functions for catdir
 */

use std::path::{Component, Path};

use walkdir::WalkDir;

use crate::matcher::IgnoreRules;

/// Name of the ignore file looked up at the target root
pub const DEFAULT_IGNORE_FILE: &str = ".catignore";

/// Render `path` relative to `root` with forward slashes
///
/// A path outside `root` is rendered whole.
pub fn relative_slash_path(path: &Path, root: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    to_slash(rel)
}

/// Join the normal components of `path` with forward slashes
pub fn to_slash(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            Component::ParentDir => Some("..".into()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Count the files a collection run would visit, for progress tracking
pub fn count_files(root: &Path, rules: &IgnoreRules, recursive: bool) -> u64 {
    let max_depth = if recursive { usize::MAX } else { 1 };
    WalkDir::new(root)
        .min_depth(1)
        .max_depth(max_depth)
        .into_iter()
        .filter_entry(|e| !(e.file_type().is_dir() && rules.is_ignored(e.path(), root, true)))
        .filter_map(Result::ok)
        .filter(|e| !e.file_type().is_dir() && !rules.is_ignored(e.path(), root, false))
        .count() as u64
}

/// Format a human-readable file size
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}
