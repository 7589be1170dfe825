//! Domain types shared by the renderer and the sync engine.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Opaque identifier of a remote page or block.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(pub String);

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for PageId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for PageId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// One structured content block, as understood by the document store.
///
/// The sync engine never looks inside a block; it only orders, counts and
/// forwards them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentBlock(pub serde_json::Value);

impl ContentBlock {
    /// A plain-text paragraph block.
    pub fn paragraph(text: &str) -> Self {
        Self(serde_json::json!({
            "object": "block",
            "type": "paragraph",
            "paragraph": {
                "rich_text": [{
                    "type": "text",
                    "text": { "content": text }
                }]
            }
        }))
    }

    /// The block's `type` field, if present.
    pub fn kind(&self) -> Option<&str> {
        self.0.get("type").and_then(serde_json::Value::as_str)
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// A local markdown document, read once and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalDocument {
    /// Path relative to the discovery root, `/`-separated.
    pub relative_path: String,
    /// Title used both for display and as the reconciliation key.
    pub canonical_title: String,
    /// Document body with any front matter removed.
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_id_display() {
        assert_eq!(PageId::from("abc-123").to_string(), "abc-123");
    }

    #[test]
    fn paragraph_block_shape() {
        let block = ContentBlock::paragraph("hello");
        assert_eq!(block.kind(), Some("paragraph"));
        assert_eq!(
            block.0["paragraph"]["rich_text"][0]["text"]["content"],
            "hello"
        );
    }

    #[test]
    fn content_block_serializes_transparently() {
        let block = ContentBlock(serde_json::json!({ "type": "divider", "divider": {} }));
        let json = serde_json::to_string(&block).expect("serialize");
        assert_eq!(json, r#"{"divider":{},"type":"divider"}"#);
    }
}
