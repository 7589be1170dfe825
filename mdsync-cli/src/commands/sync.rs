//! `mdsync sync`: reconcile every discovered document with the parent page.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use mdsync_core::config::{DEFAULT_API_BASE, PARENT_VAR, ROOT_VAR, TOKEN_VAR};
use mdsync_core::SyncConfig;
use mdsync_sync::{run_with_config, RunReport, SyncAction, SyncOutcome};

/// Arguments for `mdsync sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Notion integration token.
    #[arg(long, env = TOKEN_VAR, hide_env_values = true)]
    pub token: Option<String>,

    /// Id of the page that holds the synced pages.
    #[arg(long, env = PARENT_VAR)]
    pub parent: Option<String>,

    /// Directory to scan for markdown files (defaults to the current directory).
    #[arg(long, env = ROOT_VAR)]
    pub root: Option<PathBuf>,

    /// Pause between documents, in milliseconds.
    #[arg(long, default_value_t = 300)]
    pub pacing_ms: u64,

    #[arg(long, hide = true, default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Report what would be created or replaced without changing anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Emit the run report as JSON.
    #[arg(long)]
    pub json: bool,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let config = SyncConfig::resolve(self.token, self.parent, self.root)
            .context("invalid configuration")?
            .with_pacing(Duration::from_millis(self.pacing_ms))
            .with_api_base(self.api_base);
        log::debug!("pacing {:?}, api {}", config.pacing, config.api_base);

        let report = run_with_config(&config, self.dry_run).context("sync failed")?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("failed to serialize report")?
            );
        } else {
            print_report(&report);
        }

        let summary = &report.summary;
        if !summary.is_success() {
            bail!(
                "{} of {} documents failed to sync",
                summary.failures.len(),
                summary.total
            );
        }
        Ok(())
    }
}

fn print_report(report: &RunReport) {
    let prefix = if report.dry_run { "[dry-run] " } else { "" };
    if report.index_degraded {
        println!(
            "{prefix}{} could not list existing pages; every document was treated as new",
            "!".yellow().bold()
        );
    }

    for outcome in &report.outcomes {
        println!("{prefix}{}", outcome_line(outcome));
    }

    let summary = &report.summary;
    let rule = "=".repeat(50);
    println!();
    println!("{rule}");
    println!("Sync Summary");
    println!("{rule}");
    println!("{} Successfully synced: {}", "✓".green().bold(), summary.success_count);
    if !summary.failures.is_empty() {
        println!("{} Failed: {}", "✗".red().bold(), summary.failures.len());
        for failure in &summary.failures {
            println!("   - {}: {}", failure.title, failure.error);
        }
    }
}

fn outcome_line(outcome: &SyncOutcome) -> String {
    let mark = match &outcome.action {
        _ if !outcome.success => "✗".red().bold(),
        Some(SyncAction::Created { .. }) | Some(SyncAction::WouldCreate) => "+".green().bold(),
        Some(SyncAction::Updated { .. }) | Some(SyncAction::WouldUpdate { .. }) => {
            "↻".cyan().bold()
        }
        None => "·".bright_black(),
    };
    let verb = match &outcome.action {
        _ if !outcome.success => "failed",
        Some(SyncAction::Created { .. }) => "created",
        Some(SyncAction::Updated { .. }) => "updated",
        Some(SyncAction::WouldCreate) => "would create",
        Some(SyncAction::WouldUpdate { .. }) => "would update",
        None => "skipped",
    };

    let mut line = format!("{mark} {verb:<12} \"{}\"  ({})", outcome.title, outcome.path);
    if outcome.dropped_blocks > 0 {
        line.push_str(&format!(
            "  {}",
            format!("[{} blocks dropped]", outcome.dropped_blocks).yellow()
        ));
    }
    if let Some(error) = &outcome.error {
        line.push_str(&format!(": {error}"));
    }
    line
}
