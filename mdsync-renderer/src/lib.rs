//! # mdsync-renderer
//!
//! Converts a markdown body into the ordered block sequence the document
//! store understands.
//!
//! ```rust
//! use mdsync_renderer::{BlockRenderer, MarkdownRenderer};
//!
//! let blocks = MarkdownRenderer::new().render("# Title\n\nSome *text*.");
//! assert_eq!(blocks.len(), 2);
//! ```
//!
//! [`BlockRenderer::render`] never fails. When conversion errors it returns a
//! single paragraph holding the first [`FALLBACK_CHAR_LIMIT`] UTF-16 code
//! units of the raw body, so one malformed document cannot abort a run.

pub mod error;
pub mod markdown;

use mdsync_core::ContentBlock;

pub use error::RenderError;
pub use markdown::MarkdownRenderer;

/// UTF-16 code units of raw body kept by the fallback block. The store
/// measures text lengths in these units.
pub const FALLBACK_CHAR_LIMIT: usize = 2000;

/// Body → blocks conversion.
pub trait BlockRenderer {
    /// Convert `body`, reporting conversion failures.
    fn try_render(&self, body: &str) -> Result<Vec<ContentBlock>, RenderError>;

    /// Convert `body`, substituting [`fallback_blocks`] on failure.
    fn render(&self, body: &str) -> Vec<ContentBlock> {
        match self.try_render(body) {
            Ok(blocks) => blocks,
            Err(err) => {
                tracing::warn!("block conversion failed, using plain-text fallback: {err}");
                fallback_blocks(body)
            }
        }
    }
}

/// The single plain-text paragraph used when conversion fails.
pub fn fallback_blocks(body: &str) -> Vec<ContentBlock> {
    let (text, _) = split_at_utf16(body, FALLBACK_CHAR_LIMIT);
    vec![ContentBlock::paragraph(text)]
}

/// Split `s` after at most `max` UTF-16 code units, on a char boundary.
pub(crate) fn split_at_utf16(s: &str, max: usize) -> (&str, &str) {
    let mut units = 0;
    for (idx, c) in s.char_indices() {
        units += c.len_utf16();
        if units > max {
            return s.split_at(idx);
        }
    }
    (s, "")
}
