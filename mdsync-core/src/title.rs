//! Title resolution.
//!
//! The resolved title is both the remote page's display title and the key
//! the reconciler matches on, so two files that resolve to the same title
//! address the same remote page.

use std::path::Path;

use crate::document::FrontMatter;

/// Resolve the canonical title for a document.
///
/// A front matter `title` wins verbatim; otherwise the title is derived from
/// the file name.
pub fn resolve_title(front_matter: Option<&FrontMatter>, relative_path: &str) -> String {
    front_matter
        .and_then(FrontMatter::title)
        .unwrap_or_else(|| derive_title(relative_path))
}

/// Derive a title from a file name: `release-notes_v2.md` → `Release Notes V2`.
///
/// Splits the stem on `-` and `_` and upper-cases the first character of each
/// piece. Empty pieces from doubled separators are kept.
pub fn derive_title(relative_path: &str) -> String {
    let stem = Path::new(relative_path)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    stem.split(['-', '_'])
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
