//! Sync pipeline entrypoint used by the CLI.
//!
//! Builds the remote index once, discovers documents, reconciles them in
//! order and summarises the outcomes. Only discovery can abort a run;
//! everything after it is isolated per document.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use mdsync_core::{discovery::discover, SyncConfig};
use mdsync_renderer::{BlockRenderer, MarkdownRenderer};

use crate::error::SyncError;
use crate::index::build_index;
use crate::notion::NotionClient;
use crate::pacing::{FixedDelay, Pacer};
use crate::reconcile::{Reconciler, SyncOutcome};
use crate::store::DocumentStore;
use crate::summary::{summarize, RunSummary};

/// Inputs for one run that are independent of the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub parent_id: String,
    pub root: PathBuf,
    pub dry_run: bool,
}

/// Everything a run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub dry_run: bool,
    /// Existing pages found under the parent.
    pub indexed_pages: usize,
    /// The parent listing failed; every document was treated as new.
    pub index_degraded: bool,
    pub outcomes: Vec<SyncOutcome>,
    pub summary: RunSummary,
}

/// Run the pipeline against an arbitrary store, renderer and pacer.
pub fn run<S, R>(
    store: &S,
    renderer: &R,
    pacer: &mut dyn Pacer,
    options: &RunOptions,
) -> Result<RunReport, SyncError>
where
    S: DocumentStore + ?Sized,
    R: BlockRenderer + ?Sized,
{
    let started_at = Utc::now();
    tracing::info!("root: {}", options.root.display());
    tracing::info!("parent page: {}", options.parent_id);

    let index = build_index(store, &options.parent_id);
    tracing::info!("found {} existing pages", index.len());

    let paths = discover(&options.root)?;
    tracing::info!("found {} markdown files", paths.len());

    let outcomes = Reconciler::new(store, renderer, &index, &options.parent_id)
        .dry_run(options.dry_run)
        .run(&options.root, &paths, pacer);
    let summary = summarize(&outcomes);

    Ok(RunReport {
        started_at,
        finished_at: Utc::now(),
        dry_run: options.dry_run,
        indexed_pages: index.len(),
        index_degraded: index.is_degraded(),
        outcomes,
        summary,
    })
}

/// Run against the configured Notion workspace with the markdown renderer
/// and fixed-delay pacing.
pub fn run_with_config(config: &SyncConfig, dry_run: bool) -> Result<RunReport, SyncError> {
    let store = NotionClient::new(&config.token, &config.api_base);
    let renderer = MarkdownRenderer::new();
    let mut pacer = FixedDelay(config.pacing);
    let options = RunOptions {
        parent_id: config.parent_id.clone(),
        root: config.root.clone(),
        dry_run,
    };
    run(&store, &renderer, &mut pacer, &options)
}

