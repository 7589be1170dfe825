//! Markdown file discovery.
//!
//! Walks the root recursively and returns every `*.md` file as a sorted,
//! `/`-separated path relative to the root. Skipped:
//!
//! - hidden entries (names starting with `.`, which covers `.git`)
//! - `node_modules` and `target` directories at any depth
//! - root-level sync reports: `NOTION_SYNC_*.md` and `EXAMPLE_*.md`

use std::path::Path;

use walkdir::{DirEntry, WalkDir};

use crate::error::CoreError;

const EXCLUDED_DIRS: &[&str] = &["node_modules", "target"];
const REPORT_PREFIXES: &[&str] = &["NOTION_SYNC_", "EXAMPLE_"];
const EXTENSION: &str = "md";

/// Discover markdown documents under `root`.
pub fn discover(root: &Path) -> Result<Vec<String>, CoreError> {
    let mut found = Vec::new();
    let walker = WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_excluded(e));

    for entry in walker {
        let entry = entry.map_err(|source| CoreError::Walk {
            root: root.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() || !has_markdown_extension(entry.path()) {
            continue;
        }
        if entry.depth() == 1 && is_report_file(&entry) {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        found.push(to_slash_path(relative));
    }

    found.sort();
    Ok(found)
}

fn is_excluded(entry: &DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();
    if name.starts_with('.') {
        return true;
    }
    entry.file_type().is_dir() && EXCLUDED_DIRS.contains(&name.as_ref())
}

fn has_markdown_extension(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(EXTENSION)
}

fn is_report_file(entry: &DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();
    REPORT_PREFIXES.iter().any(|prefix| name.starts_with(prefix))
}

fn to_slash_path(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
