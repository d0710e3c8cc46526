//! Model file discovery.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Recursively collect files under `root` whose extension is `extension`.
///
/// Returns paths sorted lexicographically. A missing root yields an empty list
/// and a logged diagnostic, never an error.
pub fn find_model_files(root: &Path, extension: &str) -> Vec<PathBuf> {
    if !root.is_dir() {
        warn!(root = %root.display(), "models directory not found");
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!(error = %e, "skipping unreadable entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().and_then(|s| s.to_str()) == Some(extension))
        .collect();

    files.sort();
    files
}

/// Row label for a model: path under `root`, extension stripped, `/`-joined.
///
/// Flat directories give the bare file stem.
pub fn model_display_name(root: &Path, model: &Path) -> String {
    let relative = model.strip_prefix(root).unwrap_or(model);
    let stemmed = relative.with_extension("");
    stemmed
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Path under `root` for banners, falling back to the full path.
pub fn relative_display(root: &Path, model: &Path) -> String {
    model.strip_prefix(root).unwrap_or(model).display().to_string()
}
