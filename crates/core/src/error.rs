//! Unified error types for the cactus-core crate.
//!
//! All public-facing errors are collected here so callers can match on a
//! single enum.

use thiserror::Error;

/// Top-level error type for the cactus-core crate.
#[derive(Error, Debug)]
pub enum CactusError {
    /// An I/O error (file not found, permission denied, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization / deserialization error (debug graph dumps, config).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The input flower did not satisfy the pipeline's preconditions
    /// (non-terminal, already has built blocks, more than one group/chain).
    #[error("precondition violation: {0}")]
    Precondition(String),

    /// A post-operation invariant check (`check_pinch_graph`,
    /// `all_chains_circular`, ...) failed.
    #[error("invariant violation: {0}")]
    Invariant(String),

    /// A merge was rejected because its endpoints are not within the
    /// configured adjacency-component overlap bound.
    #[error("adjacency locality violation: {0}")]
    Locality(String),

    /// The operation was cancelled by the caller's `ProgressMonitor`.
    #[error("operation cancelled")]
    Cancelled(#[from] crate::worker::CancelledError),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CactusError>;
