//! # mdsync-sync
//!
//! Title-keyed reconciliation of local markdown documents against a remote
//! document store.
//!
//! Call [`pipeline::run_with_config`] for a full run against Notion, or
//! [`pipeline::run`] with any [`DocumentStore`], [`mdsync_renderer::BlockRenderer`]
//! and [`Pacer`].

pub mod error;
pub mod index;
pub mod notion;
pub mod pacing;
pub mod pipeline;
pub mod reconcile;
pub mod store;
pub mod summary;

pub use error::{StoreError, SyncError};
pub use index::{build_index, RemoteIndex};
pub use notion::NotionClient;
pub use pacing::{FixedDelay, Pacer, Unpaced};
pub use pipeline::{run, run_with_config, RunOptions, RunReport};
pub use reconcile::{Reconciler, SyncAction, SyncOutcome};
pub use store::{DocumentStore, RemoteChild, MAX_BLOCKS_PER_CALL};
pub use summary::{summarize, FailedDocument, RunSummary};
