//! `mdsync scan`: show what a sync would pick up, without touching Notion.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use mdsync_core::{config::ROOT_VAR, discovery::discover, document::load_document};
use mdsync_renderer::{BlockRenderer, MarkdownRenderer};
use mdsync_sync::MAX_BLOCKS_PER_CALL;

/// Arguments for `mdsync scan`.
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Directory to scan for markdown files (defaults to the current directory).
    #[arg(long, env = ROOT_VAR)]
    pub root: Option<PathBuf>,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct ScannedDocument {
    path: String,
    title: Option<String>,
    blocks: usize,
    error: Option<String>,
}

#[derive(Tabled)]
struct ScanTableRow {
    #[tabled(rename = "path")]
    path: String,
    #[tabled(rename = "title")]
    title: String,
    #[tabled(rename = "blocks")]
    blocks: String,
}

impl ScanArgs {
    pub fn run(self) -> Result<()> {
        let root = match self.root {
            Some(root) => root,
            None => std::env::current_dir().context("could not determine current directory")?,
        };
        log::debug!("scanning {}", root.display());
        let paths = discover(&root)
            .with_context(|| format!("failed to scan '{}'", root.display()))?;

        let renderer = MarkdownRenderer::new();
        let documents: Vec<ScannedDocument> = paths
            .into_iter()
            .map(|path| match load_document(&root, &path) {
                Ok(doc) => ScannedDocument {
                    blocks: renderer.render(&doc.body).len(),
                    title: Some(doc.canonical_title),
                    error: None,
                    path,
                },
                Err(err) => ScannedDocument {
                    path,
                    title: None,
                    blocks: 0,
                    error: Some(err.to_string()),
                },
            })
            .collect();

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&documents).context("failed to serialize scan")?
            );
            return Ok(());
        }

        print_table(&root, documents);
        Ok(())
    }
}

fn print_table(root: &std::path::Path, documents: Vec<ScannedDocument>) {
    println!("{} markdown files under {}", documents.len(), root.display());
    if documents.is_empty() {
        return;
    }

    let rows: Vec<ScanTableRow> = documents
        .into_iter()
        .map(|doc| ScanTableRow {
            title: match (doc.title, doc.error) {
                (Some(title), _) => title,
                (None, Some(error)) => format!("error: {error}"),
                (None, None) => String::new(),
            },
            blocks: if doc.blocks > MAX_BLOCKS_PER_CALL {
                format!("{} ({} dropped)", doc.blocks, doc.blocks - MAX_BLOCKS_PER_CALL)
            } else {
                doc.blocks.to_string()
            },
            path: doc.path,
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}
