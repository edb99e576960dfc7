//! Shared counter store port.

use std::time::Duration;

use async_trait::async_trait;

/// Atomic integer counters with expiry, shared across every server process.
///
/// This is the only shared mutable state the governor touches. Implementations
/// must make `increment_with_expiry` atomic under concurrent callers.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Current value, `None` when the key is absent or expired.
    async fn get(&self, key: &str) -> Result<Option<u64>, CounterStoreError>;

    /// Increment by one, creating the key with `ttl` when absent.
    /// Returns the value after the increment.
    async fn increment_with_expiry(&self, key: &str, ttl: Duration)
    -> Result<u64, CounterStoreError>;

    /// Increment only while the value is below `limit`, as one atomic step.
    /// Returns the value after the increment, or `None` (and leaves the key
    /// untouched) when it had already reached `limit`.
    async fn increment_below(
        &self,
        key: &str,
        limit: u64,
        ttl: Duration,
    ) -> Result<Option<u64>, CounterStoreError>;
}

/// Counter store errors.
#[derive(Debug, thiserror::Error)]
pub enum CounterStoreError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Operation failed: {0}")]
    Operation(String),
}
