//! mdsync: mirror a tree of markdown files into Notion pages.
//!
//! # Usage
//!
//! ```text
//! mdsync sync [--root <dir>] [--token <t>] [--parent <id>] [--dry-run] [--json]
//! mdsync scan [--root <dir>] [--json]
//! ```
//!
//! `--token`, `--parent` and `--root` fall back to `NOTION_TOKEN`,
//! `NOTION_PARENT_PAGE` and `GITHUB_WORKSPACE`.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{scan::ScanArgs, sync::SyncArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "mdsync",
    version,
    about = "Sync markdown documents to Notion pages by title",
    long_about = None,
)]
struct Cli {
    /// Log debug detail (overridden by RUST_LOG).
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create or replace one page per markdown file under the parent page.
    Sync(SyncArgs),

    /// List the documents a sync would process and their resolved titles.
    Scan(ScanArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.command {
        Commands::Sync(args) => args.run(),
        Commands::Scan(args) => args.run(),
    }
}
