//! Error types for mdsync-sync.

use thiserror::Error;

use mdsync_core::CoreError;

/// Failures reported by a [`crate::store::DocumentStore`].
///
/// Every variant is document-scoped: the reconciler records it against the
/// document being processed and moves on.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The request never produced an HTTP response (DNS, TLS, timeout, ...).
    #[error("request to {endpoint} failed: {message}")]
    Transport { endpoint: String, message: String },

    /// The store answered with a non-success status.
    #[error("store rejected request ({status} {code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    /// The store answered with a body we could not interpret.
    #[error("unexpected response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },
}

/// Errors that abort a whole run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Configuration or discovery failure.
    #[error(transparent)]
    Core(#[from] CoreError),
}
