//! The document-store capability the reconciler drives.
//!
//! Implemented over HTTP by [`crate::notion::NotionClient`]; tests use an
//! in-memory implementation.

use serde::{Deserialize, Serialize};

use mdsync_core::{ContentBlock, PageId};

use crate::error::StoreError;

/// Hard ceiling on blocks per create/append call.
pub const MAX_BLOCKS_PER_CALL: usize = 100;

/// Page size used when listing the parent container.
pub const LIST_PAGE_SIZE: usize = 100;

/// Child kind the index keeps; everything else under the parent is ignored.
pub const PAGE_KIND: &str = "child_page";

/// One entry returned by a children listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteChild {
    pub id: PageId,
    /// Store-specific kind, e.g. `child_page` or `paragraph`.
    pub kind: String,
    /// Display title; only pages carry one.
    pub title: Option<String>,
}

impl RemoteChild {
    pub fn is_page(&self) -> bool {
        self.kind == PAGE_KIND
    }
}

/// Remote operations needed to reconcile documents.
///
/// Listings return a single page of results; callers never paginate.
pub trait DocumentStore {
    /// Immediate children of `container_id`, at most `page_size` of them.
    fn list_children(
        &self,
        container_id: &str,
        page_size: usize,
    ) -> Result<Vec<RemoteChild>, StoreError>;

    /// Direct child blocks of a page.
    fn list_blocks(&self, page_id: &str) -> Result<Vec<RemoteChild>, StoreError>;

    fn delete_block(&self, block_id: &str) -> Result<(), StoreError>;

    /// Append `blocks` (at most [`MAX_BLOCKS_PER_CALL`]) to a page.
    fn append_children(&self, page_id: &str, blocks: &[ContentBlock]) -> Result<(), StoreError>;

    /// Create a titled page under `parent_id` with `blocks` as its content.
    fn create_page(
        &self,
        parent_id: &str,
        title: &str,
        blocks: &[ContentBlock],
    ) -> Result<PageId, StoreError>;
}
