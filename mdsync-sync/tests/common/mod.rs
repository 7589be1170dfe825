//! In-memory document store used by the reconciliation tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use mdsync_core::{ContentBlock, PageId};
use mdsync_sync::{DocumentStore, RemoteChild, StoreError, MAX_BLOCKS_PER_CALL};

pub const PARENT: &str = "parent-page";

#[derive(Debug, Clone)]
pub struct StoredBlock {
    pub id: String,
    pub kind: String,
    pub block: Option<ContentBlock>,
    pub deletable: bool,
}

#[derive(Debug, Clone)]
pub struct StoredPage {
    pub id: String,
    pub parent: String,
    pub title: String,
    pub blocks: Vec<StoredBlock>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListChildren(String),
    ListBlocks(String),
    Delete(String),
    Append { page: String, count: usize },
    Create { title: String, count: usize },
}

#[derive(Debug, Default)]
struct Inner {
    pages: Vec<StoredPage>,
    others: Vec<RemoteChild>,
    next_id: usize,
    calls: Vec<Call>,
    fail_listing: bool,
    fail_append: HashSet<String>,
    fail_create: HashSet<String>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RefCell<Inner>,
}

fn rejected(message: &str) -> StoreError {
    StoreError::Api {
        status: 400,
        code: "validation_error".into(),
        message: message.into(),
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an existing page under the parent and return its id.
    pub fn seed_page(&self, title: &str, blocks: usize, undeletable: usize) -> String {
        let mut inner = self.inner.borrow_mut();
        inner.next_id += 1;
        let id = format!("page-{}", inner.next_id);
        let mut stored = Vec::new();
        for i in 0..blocks {
            stored.push(StoredBlock {
                id: format!("{id}-old-{i}"),
                kind: "paragraph".into(),
                block: Some(ContentBlock::paragraph("old")),
                deletable: true,
            });
        }
        for i in 0..undeletable {
            stored.push(StoredBlock {
                id: format!("{id}-db-{i}"),
                kind: "child_database".into(),
                block: None,
                deletable: false,
            });
        }
        inner.pages.push(StoredPage {
            id: id.clone(),
            parent: PARENT.into(),
            title: title.into(),
            blocks: stored,
        });
        id
    }

    /// Seed a non-page child of the parent.
    pub fn seed_other(&self, id: &str, kind: &str) {
        self.inner.borrow_mut().others.push(RemoteChild {
            id: PageId::from(id),
            kind: kind.into(),
            title: None,
        });
    }

    pub fn fail_listing(&self) {
        self.inner.borrow_mut().fail_listing = true;
    }

    pub fn fail_append_for(&self, page_id: &str) {
        self.inner.borrow_mut().fail_append.insert(page_id.into());
    }

    pub fn fail_create_for(&self, title: &str) {
        self.inner.borrow_mut().fail_create.insert(title.into());
    }

    pub fn pages(&self) -> Vec<StoredPage> {
        self.inner.borrow().pages.clone()
    }

    pub fn page_titled(&self, title: &str) -> Option<StoredPage> {
        self.pages().into_iter().find(|p| p.title == title)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.inner.borrow_mut().calls.clear();
    }

    fn store_blocks(inner: &mut Inner, page_id: &str, blocks: &[ContentBlock]) -> Vec<StoredBlock> {
        blocks
            .iter()
            .enumerate()
            .map(|(i, block)| {
                inner.next_id += 1;
                StoredBlock {
                    id: format!("{page_id}-b{}-{i}", inner.next_id),
                    kind: block.kind().unwrap_or("unknown").to_string(),
                    block: Some(block.clone()),
                    deletable: true,
                }
            })
            .collect()
    }
}

impl DocumentStore for MemoryStore {
    fn list_children(
        &self,
        container_id: &str,
        page_size: usize,
    ) -> Result<Vec<RemoteChild>, StoreError> {
        let mut inner = self.inner.borrow_mut();
        inner.calls.push(Call::ListChildren(container_id.into()));
        if inner.fail_listing {
            return Err(StoreError::Transport {
                endpoint: format!("GET /blocks/{container_id}/children"),
                message: "connection reset".into(),
            });
        }
        let mut children: Vec<RemoteChild> = inner
            .pages
            .iter()
            .filter(|p| p.parent == container_id)
            .map(|p| RemoteChild {
                id: PageId::from(p.id.as_str()),
                kind: "child_page".into(),
                title: Some(p.title.clone()),
            })
            .collect();
        children.extend(inner.others.iter().cloned());
        children.truncate(page_size);
        Ok(children)
    }

    fn list_blocks(&self, page_id: &str) -> Result<Vec<RemoteChild>, StoreError> {
        let mut inner = self.inner.borrow_mut();
        inner.calls.push(Call::ListBlocks(page_id.into()));
        let page = inner
            .pages
            .iter()
            .find(|p| p.id == page_id)
            .ok_or_else(|| rejected("page not found"))?;
        Ok(page
            .blocks
            .iter()
            .take(100)
            .map(|b| RemoteChild {
                id: PageId::from(b.id.as_str()),
                kind: b.kind.clone(),
                title: None,
            })
            .collect())
    }

    fn delete_block(&self, block_id: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.borrow_mut();
        inner.calls.push(Call::Delete(block_id.into()));
        for page in &mut inner.pages {
            if let Some(pos) = page.blocks.iter().position(|b| b.id == block_id) {
                if !page.blocks[pos].deletable {
                    return Err(rejected("block cannot be deleted"));
                }
                page.blocks.remove(pos);
                return Ok(());
            }
        }
        Err(rejected("block not found"))
    }

    fn append_children(&self, page_id: &str, blocks: &[ContentBlock]) -> Result<(), StoreError> {
        let mut inner = self.inner.borrow_mut();
        inner.calls.push(Call::Append {
            page: page_id.into(),
            count: blocks.len(),
        });
        if blocks.len() > MAX_BLOCKS_PER_CALL {
            return Err(rejected("too many children"));
        }
        if inner.fail_append.contains(page_id) {
            return Err(rejected("append refused"));
        }
        let stored = Self::store_blocks(&mut inner, page_id, blocks);
        let page = inner
            .pages
            .iter_mut()
            .find(|p| p.id == page_id)
            .ok_or_else(|| rejected("page not found"))?;
        page.blocks.extend(stored);
        Ok(())
    }

    fn create_page(
        &self,
        parent_id: &str,
        title: &str,
        blocks: &[ContentBlock],
    ) -> Result<PageId, StoreError> {
        let mut inner = self.inner.borrow_mut();
        inner.calls.push(Call::Create {
            title: title.into(),
            count: blocks.len(),
        });
        if blocks.len() > MAX_BLOCKS_PER_CALL {
            return Err(rejected("too many children"));
        }
        if inner.fail_create.contains(title) {
            return Err(rejected("create refused"));
        }
        inner.next_id += 1;
        let id = format!("page-{}", inner.next_id);
        let stored = Self::store_blocks(&mut inner, &id, blocks);
        inner.pages.push(StoredPage {
            id: id.clone(),
            parent: parent_id.into(),
            title: title.into(),
            blocks: stored,
        });
        Ok(PageId::from(id))
    }
}

/// Write `files` (relative path, contents) under `root`.
pub fn write_docs(root: &Path, files: &[(&str, &str)]) {
    for (rel, contents) in files {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(path, contents).expect("write doc");
    }
}

/// Concatenated text content of a stored block.
pub fn block_text(block: &StoredBlock) -> String {
    let Some(block) = &block.block else {
        return String::new();
    };
    let kind = block.kind().unwrap_or_default();
    block.0[kind]["rich_text"]
        .as_array()
        .map(|segments| {
            segments
                .iter()
                .filter_map(|s| s["text"]["content"].as_str())
                .collect()
        })
        .unwrap_or_default()
}
