//! Run configuration.
//!
//! Values arrive from CLI flags or their environment fallbacks; this module
//! only validates them. A missing credential or parent id is fatal and is
//! reported before any remote call is made.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{io_err, CoreError};

/// Environment variable holding the store access token.
pub const TOKEN_VAR: &str = "NOTION_TOKEN";
/// Environment variable holding the parent page id.
pub const PARENT_VAR: &str = "NOTION_PARENT_PAGE";
/// Environment variable holding the discovery root.
pub const ROOT_VAR: &str = "GITHUB_WORKSPACE";

/// Delay between consecutive documents.
pub const DEFAULT_PACING: Duration = Duration::from_millis(300);

/// Default REST endpoint of the document store.
pub const DEFAULT_API_BASE: &str = "https://api.notion.com/v1";

/// Validated settings for one sync run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    pub token: String,
    pub parent_id: String,
    pub root: PathBuf,
    pub pacing: Duration,
    pub api_base: String,
}

impl SyncConfig {
    /// Validate raw inputs into a [`SyncConfig`].
    ///
    /// Empty strings count as absent. `root` defaults to the current
    /// directory.
    pub fn resolve(
        token: Option<String>,
        parent_id: Option<String>,
        root: Option<PathBuf>,
    ) -> Result<Self, CoreError> {
        let token = required(token, TOKEN_VAR)?;
        let parent_id = required(parent_id, PARENT_VAR)?;
        let root = match root {
            Some(root) => root,
            None => std::env::current_dir().map_err(|e| io_err(".", e))?,
        };
        Ok(Self {
            token,
            parent_id,
            root,
            pacing: DEFAULT_PACING,
            api_base: DEFAULT_API_BASE.to_string(),
        })
    }

    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

fn required(value: Option<String>, var: &'static str) -> Result<String, CoreError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(CoreError::MissingConfig { var }),
    }
}
