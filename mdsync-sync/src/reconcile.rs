//! Reconciler: per-document create-or-replace against the remote index.
//!
//! ## Protocol, per document
//!
//! 1. Load the file and resolve its title.
//! 2. Render the body (never fails; see [`BlockRenderer::render`]).
//! 3. Title found in the index → **replace**: list the page's child blocks,
//!    delete them one by one (individual failures are swallowed), then append
//!    the first [`MAX_BLOCKS_PER_CALL`] rendered blocks.
//! 4. Title not found → **create** the page with the first
//!    [`MAX_BLOCKS_PER_CALL`] blocks as its content.
//! 5. Record a [`SyncOutcome`]; any error from steps 1–4 becomes a failed
//!    outcome for this document only.
//! 6. Pace before the next document, whatever the outcome.
//!
//! Nothing is retried and nothing is rolled back: a replace that fails after
//! deleting leaves the page empty or partially filled until the next run.

use std::path::Path;

use serde::Serialize;
use thiserror::Error;

use mdsync_core::{document::load_document, ContentBlock, CoreError, LocalDocument, PageId};
use mdsync_renderer::BlockRenderer;

use crate::error::StoreError;
use crate::index::RemoteIndex;
use crate::pacing::Pacer;
use crate::store::{DocumentStore, RemoteChild, MAX_BLOCKS_PER_CALL};

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// What the reconciler did (or would do) for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SyncAction {
    Created {
        page_id: PageId,
    },
    Updated {
        page_id: PageId,
        /// Old blocks deleted.
        removed: usize,
        /// Old blocks the store refused to delete.
        kept: usize,
    },
    /// Dry run: the page would be created.
    WouldCreate,
    /// Dry run: this page would be replaced.
    WouldUpdate {
        page_id: PageId,
    },
}

/// Terminal result for one discovered document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncOutcome {
    pub path: String,
    pub title: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<SyncAction>,
    /// Rendered blocks beyond the per-call ceiling that were not sent.
    pub dropped_blocks: usize,
}

impl SyncOutcome {
    fn succeeded(doc: &LocalDocument, action: SyncAction, dropped_blocks: usize) -> Self {
        Self {
            path: doc.relative_path.clone(),
            title: doc.canonical_title.clone(),
            success: true,
            error: None,
            action: Some(action),
            dropped_blocks,
        }
    }

    fn failed(path: &str, title: &str, error: String) -> Self {
        Self {
            path: path.to_string(),
            title: title.to_string(),
            success: false,
            error: Some(error),
            action: None,
            dropped_blocks: 0,
        }
    }
}

/// Per-document failure, before it is flattened into a [`SyncOutcome`].
#[derive(Debug, Error)]
enum DocumentError {
    #[error(transparent)]
    Load(#[from] CoreError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

// ---------------------------------------------------------------------------
// Reconciler
// ---------------------------------------------------------------------------

/// Drives one run's worth of documents against a store.
pub struct Reconciler<'a, S: ?Sized, R: ?Sized> {
    store: &'a S,
    renderer: &'a R,
    index: &'a RemoteIndex,
    parent_id: &'a str,
    dry_run: bool,
}

impl<'a, S, R> Reconciler<'a, S, R>
where
    S: DocumentStore + ?Sized,
    R: BlockRenderer + ?Sized,
{
    pub fn new(store: &'a S, renderer: &'a R, index: &'a RemoteIndex, parent_id: &'a str) -> Self {
        Self {
            store,
            renderer,
            index,
            parent_id,
            dry_run: false,
        }
    }

    /// Plan only: render and look up, but never mutate the store.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Process every path under `root` in order, pacing between documents.
    ///
    /// Returns exactly one outcome per path. Dry runs are not paced.
    pub fn run(&self, root: &Path, paths: &[String], pacer: &mut dyn Pacer) -> Vec<SyncOutcome> {
        let mut outcomes = Vec::with_capacity(paths.len());
        for path in paths {
            outcomes.push(self.sync_path(root, path));
            if !self.dry_run {
                pacer.wait();
            }
        }
        outcomes
    }

    /// Load and reconcile a single file. Never fails; errors become a failed
    /// outcome titled with the path.
    pub fn sync_path(&self, root: &Path, relative_path: &str) -> SyncOutcome {
        match load_document(root, relative_path).map_err(DocumentError::from) {
            Ok(doc) => self.sync_document(&doc),
            Err(err) => {
                tracing::error!("failed to load {relative_path}: {err}");
                SyncOutcome::failed(relative_path, relative_path, err.to_string())
            }
        }
    }

    /// Reconcile an already-loaded document.
    pub fn sync_document(&self, doc: &LocalDocument) -> SyncOutcome {
        tracing::info!(
            "processing {} -> \"{}\"",
            doc.relative_path,
            doc.canonical_title
        );
        let blocks = self.renderer.render(&doc.body);
        let (batch, dropped) = first_batch(&blocks);
        if dropped > 0 {
            tracing::warn!(
                "\"{}\" renders to {} blocks; only the first {MAX_BLOCKS_PER_CALL} are sent",
                doc.canonical_title,
                blocks.len()
            );
        }

        let result = match (self.index.get(&doc.canonical_title), self.dry_run) {
            (Some(page_id), false) => self.replace_page(page_id, batch),
            (None, false) => self.create_page(&doc.canonical_title, batch),
            (Some(page_id), true) => Ok(SyncAction::WouldUpdate {
                page_id: page_id.clone(),
            }),
            (None, true) => Ok(SyncAction::WouldCreate),
        };

        match result {
            Ok(action) => {
                log_action(&doc.canonical_title, &action);
                SyncOutcome::succeeded(doc, action, dropped)
            }
            Err(err) => {
                tracing::error!("failed to sync {}: {err}", doc.relative_path);
                SyncOutcome::failed(&doc.relative_path, &doc.canonical_title, err.to_string())
            }
        }
    }

    fn replace_page(
        &self,
        page_id: &PageId,
        blocks: &[ContentBlock],
    ) -> Result<SyncAction, DocumentError> {
        tracing::info!("  updating existing page {page_id}");
        let existing = self.store.list_blocks(&page_id.0)?;

        let mut removed = 0;
        for block in &existing {
            if swallow_delete(self.store.delete_block(&block.id.0), block) {
                removed += 1;
            }
        }

        if !blocks.is_empty() {
            self.store.append_children(&page_id.0, blocks)?;
        }

        Ok(SyncAction::Updated {
            page_id: page_id.clone(),
            removed,
            kept: existing.len() - removed,
        })
    }

    fn create_page(&self, title: &str, blocks: &[ContentBlock]) -> Result<SyncAction, DocumentError> {
        tracing::info!("  creating new page \"{title}\"");
        let page_id = self.store.create_page(self.parent_id, title, blocks)?;
        Ok(SyncAction::Created { page_id })
    }
}

// ---------------------------------------------------------------------------
// Policies
// ---------------------------------------------------------------------------

/// Per-block delete failures never fail the document: some block kinds
/// cannot be deleted. Returns whether the block was removed.
fn swallow_delete(result: Result<(), StoreError>, block: &RemoteChild) -> bool {
    match result {
        Ok(()) => true,
        Err(err) => {
            tracing::debug!("  could not delete {} block {}: {err}", block.kind, block.id);
            false
        }
    }
}

/// The blocks sent in one call, and how many were left out.
pub fn first_batch(blocks: &[ContentBlock]) -> (&[ContentBlock], usize) {
    let sent = blocks.len().min(MAX_BLOCKS_PER_CALL);
    (&blocks[..sent], blocks.len() - sent)
}

fn log_action(title: &str, action: &SyncAction) {
    match action {
        SyncAction::Created { page_id } => tracing::info!("  created \"{title}\" ({page_id})"),
        SyncAction::Updated { kept: 0, .. } => tracing::info!("  updated \"{title}\""),
        SyncAction::Updated { kept, .. } => {
            tracing::info!("  updated \"{title}\" ({kept} old blocks could not be removed)")
        }
        SyncAction::WouldCreate => tracing::info!("  [dry-run] would create \"{title}\""),
        SyncAction::WouldUpdate { .. } => tracing::info!("  [dry-run] would update \"{title}\""),
    }
}
