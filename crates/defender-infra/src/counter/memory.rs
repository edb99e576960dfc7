//! In-memory counter store - used as fallback when Redis is unavailable.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use defender_core::ports::{CounterStore, CounterStoreError};

struct CounterEntry {
    value: u64,
    expires_at: Instant,
}

impl CounterEntry {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Counters in a HashMap behind an async RwLock.
///
/// Increments take the write lock, so they are atomic within one process.
/// Note: counts are per-process and lost on restart; use Redis to share
/// quotas across instances.
pub struct InMemoryCounterStore {
    store: RwLock<HashMap<String, CounterEntry>>,
}

impl InMemoryCounterStore {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(HashMap::new()),
        }
    }

    /// Overwrite a counter.
    pub async fn set(&self, key: &str, value: u64, ttl: Duration) {
        let mut store = self.store.write().await;
        store.insert(
            key.to_string(),
            CounterEntry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    /// Drop expired counters.
    pub async fn purge_expired(&self) -> usize {
        let mut store = self.store.write().await;
        let before = store.len();
        store.retain(|_, entry| !entry.is_expired());
        before - store.len()
    }
}

impl Default for InMemoryCounterStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CounterStore for InMemoryCounterStore {
    async fn get(&self, key: &str) -> Result<Option<u64>, CounterStoreError> {
        let store = self.store.read().await;
        Ok(store
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.value))
    }

    async fn increment_with_expiry(
        &self,
        key: &str,
        ttl: Duration,
    ) -> Result<u64, CounterStoreError> {
        let mut store = self.store.write().await;

        let entry = store
            .entry(key.to_string())
            .and_modify(|entry| {
                if entry.is_expired() {
                    entry.value = 0;
                    entry.expires_at = Instant::now() + ttl;
                }
            })
            .or_insert_with(|| CounterEntry {
                value: 0,
                expires_at: Instant::now() + ttl,
            });
        entry.value += 1;

        Ok(entry.value)
    }

    async fn increment_below(
        &self,
        key: &str,
        limit: u64,
        ttl: Duration,
    ) -> Result<Option<u64>, CounterStoreError> {
        let mut store = self.store.write().await;

        let (current, expires_at) = store
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map_or((0, Instant::now() + ttl), |entry| {
                (entry.value, entry.expires_at)
            });
        if current >= limit {
            return Ok(None);
        }

        store.insert(
            key.to_string(),
            CounterEntry {
                value: current + 1,
                expires_at,
            },
        );

        Ok(Some(current + 1))
    }
}
