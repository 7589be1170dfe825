//! Error types for mdsync-renderer.

use thiserror::Error;

/// Conversion failures. Callers normally never see these: the provided
/// [`crate::BlockRenderer::render`] replaces them with a plain-text fallback.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderError {
    /// The markdown event stream closed a block that was never opened.
    #[error("malformed markdown structure: {reason}")]
    Malformed { reason: String },

    /// A single block needs more rich-text segments than the store accepts.
    #[error("{block} block has {count} rich text segments (limit {limit})")]
    RichTextLimit {
        block: &'static str,
        count: usize,
        limit: usize,
    },
}
