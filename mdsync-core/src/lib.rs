//! mdsync core library: domain types, configuration, document loading and
//! discovery.
//!
//! - [`types`]: newtypes and domain structs
//! - [`error`]: [`CoreError`]
//! - [`config`]: [`SyncConfig`] resolution
//! - [`document`]: front matter split and [`document::load_document`]
//! - [`title`]: [`title::resolve_title`]
//! - [`discovery`]: markdown file discovery

pub mod config;
pub mod discovery;
pub mod document;
pub mod error;
pub mod title;
pub mod types;

pub use config::SyncConfig;
pub use error::CoreError;
pub use types::{ContentBlock, LocalDocument, PageId};
