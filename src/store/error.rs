//! Store-specific error types
//!
//! The Store is an external collaborator; these errors describe the ways its
//! adapter can fail. Query failures are surfaced to callers as "load failed,
//! previous list retained" and are never retried automatically.

use thiserror::Error;

/// Errors reported by a [`Store`](super::Store) adapter
#[derive(Debug, Error)]
pub enum StoreError {
    /// The underlying metadata query failed
    #[error("Store query failed: {0}")]
    Query(String),

    /// A direct file-size probe failed
    #[error("Failed to stat {path}: {source}")]
    Stat {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The store is not reachable at all
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Generic I/O failure from the adapter
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
