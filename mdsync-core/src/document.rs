//! Content loader: reads a markdown file and splits off its YAML front matter.
//!
//! A front matter block starts with a `---` line at the very top of the file
//! (an optional BOM is tolerated) and ends at the next `---` line. Without a
//! closing delimiter the whole file is treated as body.

use std::path::Path;

use serde_yaml::{Mapping, Value};

use crate::error::{io_err, CoreError};
use crate::title::resolve_title;
use crate::types::LocalDocument;

/// Parsed front matter fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrontMatter {
    fields: Mapping,
}

impl FrontMatter {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// The declared `title`, if it is a non-empty scalar.
    pub fn title(&self) -> Option<String> {
        match self.get("title")? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

/// Split `input` into its front matter (if any) and body.
///
/// Returns an error only when a delimited block exists but is not valid YAML.
/// A block that parses to something other than a mapping is ignored.
pub fn split_front_matter(input: &str) -> Result<(Option<FrontMatter>, &str), serde_yaml::Error> {
    let text = input.strip_prefix('\u{feff}').unwrap_or(input);
    let Some(rest) = strip_opening_delimiter(text) else {
        return Ok((None, input));
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Ok((parse_fields(yaml)?, body));
        }
        offset += line.len();
    }

    Ok((None, input))
}

fn strip_opening_delimiter(text: &str) -> Option<&str> {
    let (first, rest) = match text.find('\n') {
        Some(i) => (&text[..i], &text[i + 1..]),
        None => (text, ""),
    };
    (first.trim_end() == "---").then_some(rest)
}

fn parse_fields(yaml: &str) -> Result<Option<FrontMatter>, serde_yaml::Error> {
    if yaml.trim().is_empty() {
        return Ok(None);
    }
    match serde_yaml::from_str::<Value>(yaml)? {
        Value::Mapping(fields) => Ok(Some(FrontMatter { fields })),
        _ => Ok(None),
    }
}

/// Read `relative_path` under `root` into a [`LocalDocument`].
///
/// Invalid UTF-8 sequences are replaced with U+FFFD.
pub fn load_document(root: &Path, relative_path: &str) -> Result<LocalDocument, CoreError> {
    let path = root.join(relative_path);
    let bytes = std::fs::read(&path).map_err(|e| io_err(&path, e))?;
    let raw = String::from_utf8_lossy(&bytes);
    let (front_matter, body) = split_front_matter(&raw)
        .map_err(|source| CoreError::FrontMatter { path: path.clone(), source })?;

    Ok(LocalDocument {
        relative_path: relative_path.to_string(),
        canonical_title: resolve_title(front_matter.as_ref(), relative_path),
        body: body.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_front_matter_returns_whole_input() {
        let (fm, body) = split_front_matter("# Title\nBody").unwrap();
        assert!(fm.is_none());
        assert_eq!(body, "# Title\nBody");
    }

    #[test]
    fn front_matter_is_split_from_body() {
        let input = "---\ntitle: Release Notes\ntags: [a, b]\n---\n# Heading\n";
        let (fm, body) = split_front_matter(input).unwrap();
        let fm = fm.expect("front matter");
        assert_eq!(fm.title().as_deref(), Some("Release Notes"));
        assert!(fm.get("tags").is_some());
        assert_eq!(body, "# Heading\n");
    }

    #[test]
    fn bom_before_delimiter_is_tolerated() {
        let input = "\u{feff}---\ntitle: X\n---\nbody";
        let (fm, body) = split_front_matter(input).unwrap();
        assert_eq!(fm.unwrap().title().as_deref(), Some("X"));
        assert_eq!(body, "body");
    }

    #[test]
    fn crlf_delimiters_are_recognised() {
        let input = "---\r\ntitle: Windows\r\n---\r\nbody\r\n";
        let (fm, body) = split_front_matter(input).unwrap();
        assert_eq!(fm.unwrap().title().as_deref(), Some("Windows"));
        assert_eq!(body, "body\r\n");
    }

    #[test]
    fn unclosed_block_is_treated_as_body() {
        let input = "---\ntitle: Dangling\n# no closing";
        let (fm, body) = split_front_matter(input).unwrap();
        assert!(fm.is_none());
        assert_eq!(body, input);
    }

    #[test]
    fn empty_block_yields_no_fields() {
        let (fm, body) = split_front_matter("---\n---\ntext").unwrap();
        assert!(fm.is_none());
        assert_eq!(body, "text");
    }

    #[test]
    fn non_mapping_block_is_ignored() {
        let (fm, body) = split_front_matter("---\n- a\n- b\n---\ntext").unwrap();
        assert!(fm.is_none());
        assert_eq!(body, "text");
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        assert!(split_front_matter("---\ntitle: [unclosed\n---\ntext").is_err());
    }

    #[test]
    fn scalar_titles_are_stringified() {
        let (fm, _) = split_front_matter("---\ntitle: 2024\n---\n").unwrap();
        assert_eq!(fm.unwrap().title().as_deref(), Some("2024"));
    }

    #[test]
    fn empty_title_is_absent() {
        let (fm, _) = split_front_matter("---\ntitle: ''\nother: 1\n---\n").unwrap();
        assert!(fm.unwrap().title().is_none());
    }
}
