//! Domain-level error types.

use thiserror::Error;

use crate::ports::{CounterStoreError, FetchError};

/// Errors surfaced by the request governor.
///
/// Client-facing rejections (missing User-Agent, exhausted quota) are not
/// errors: they are regular outcomes carrying headers. Only failures the
/// governor cannot turn into a response end up here.
#[derive(Debug, Error)]
pub enum GovernanceError {
    #[error("Counter store unavailable: {0}")]
    CounterStoreUnavailable(#[from] CounterStoreError),

    #[error("Upstream fetch failed: {0}")]
    UpstreamFetch(#[from] FetchError),

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    Constraint(String),
}
