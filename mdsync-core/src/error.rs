//! Error types for mdsync-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from loading configuration and documents.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Underlying I/O failure, with the offending path.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The YAML front matter block could not be parsed.
    #[error("failed to parse front matter in {path}: {source}")]
    FrontMatter {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A required configuration value was absent or empty.
    #[error("{var} environment variable is required")]
    MissingConfig { var: &'static str },

    /// The discovery root could not be walked.
    #[error("failed to scan {root}: {source}")]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// Convenience constructor for [`CoreError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> CoreError {
    CoreError::Io {
        path: path.into(),
        source,
    }
}
