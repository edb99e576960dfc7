//! Test doubles for the governance ports.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use serde::Serialize;

use crate::domain::ApiApplication;
use crate::ports::{
    ApiTokenResolver, AuthError, Clock, CounterStore, CounterStoreError, FetchError,
    ListingFetcher, ListingFilter, ListingPage,
};

/// Clock that only moves when told to.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Self {
        let now = Utc
            .with_ymd_and_hms(year, month, day, hour, minute, 0)
            .single()
            .expect("valid test timestamp");
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn advance_minutes(&self, minutes: i64) {
        let mut now = self.now.lock().expect("clock mutex poisoned");
        *now += TimeDelta::minutes(minutes);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock mutex poisoned")
    }
}

/// Counters without expiry; windows are told apart by key alone.
pub struct MemoryCounters {
    counts: Mutex<HashMap<String, u64>>,
    failing: bool,
}

impl MemoryCounters {
    pub fn new() -> Self {
        Self {
            counts: Mutex::new(HashMap::new()),
            failing: false,
        }
    }

    /// A store whose every call fails.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::new()
        }
    }

    pub fn seed(&self, key: &str, value: u64) {
        self.counts
            .lock()
            .expect("counter mutex poisoned")
            .insert(key.to_string(), value);
    }

    pub fn value(&self, key: &str) -> Option<u64> {
        self.counts
            .lock()
            .expect("counter mutex poisoned")
            .get(key)
            .copied()
    }

    fn ensure_up(&self) -> Result<(), CounterStoreError> {
        if self.failing {
            return Err(CounterStoreError::Connection("store is down".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl CounterStore for MemoryCounters {
    async fn get(&self, key: &str) -> Result<Option<u64>, CounterStoreError> {
        self.ensure_up()?;
        Ok(self.value(key))
    }

    async fn increment_with_expiry(
        &self,
        key: &str,
        _ttl: Duration,
    ) -> Result<u64, CounterStoreError> {
        self.ensure_up()?;
        let mut counts = self.counts.lock().expect("counter mutex poisoned");
        let count = counts.entry(key.to_string()).or_insert(0);
        *count += 1;
        Ok(*count)
    }

    async fn increment_below(
        &self,
        key: &str,
        limit: u64,
        _ttl: Duration,
    ) -> Result<Option<u64>, CounterStoreError> {
        self.ensure_up()?;
        let mut counts = self.counts.lock().expect("counter mutex poisoned");
        let count = counts.entry(key.to_string()).or_insert(0);
        if *count >= limit {
            return Ok(None);
        }
        *count += 1;
        Ok(Some(*count))
    }
}

/// `MemoryCounters` that yields to the scheduler before every call, so
/// concurrent admissions interleave between `check` and `commit`.
pub struct YieldingCounters {
    inner: MemoryCounters,
}

impl YieldingCounters {
    pub fn new() -> Self {
        Self {
            inner: MemoryCounters::new(),
        }
    }

    pub fn inner(&self) -> &MemoryCounters {
        &self.inner
    }
}

#[async_trait]
impl CounterStore for YieldingCounters {
    async fn get(&self, key: &str) -> Result<Option<u64>, CounterStoreError> {
        tokio::task::yield_now().await;
        self.inner.get(key).await
    }

    async fn increment_with_expiry(
        &self,
        key: &str,
        ttl: Duration,
    ) -> Result<u64, CounterStoreError> {
        tokio::task::yield_now().await;
        self.inner.increment_with_expiry(key, ttl).await
    }

    async fn increment_below(
        &self,
        key: &str,
        limit: u64,
        ttl: Duration,
    ) -> Result<Option<u64>, CounterStoreError> {
        tokio::task::yield_now().await;
        self.inner.increment_below(key, limit, ttl).await
    }
}

/// Fixed token table.
#[derive(Default)]
pub struct StaticTokens {
    applications: Vec<ApiApplication>,
    failing: bool,
}

impl StaticTokens {
    pub fn with(applications: Vec<ApiApplication>) -> Self {
        Self {
            applications,
            failing: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            applications: Vec::new(),
            failing: true,
        }
    }
}

#[async_trait]
impl ApiTokenResolver for StaticTokens {
    async fn resolve_token(&self, token: &str) -> Result<Option<ApiApplication>, AuthError> {
        if self.failing {
            return Err(AuthError::Backend("token store is down".to_string()));
        }
        Ok(self
            .applications
            .iter()
            .find(|app| app.api_token == token)
            .cloned())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Item {
    pub name: String,
}

/// Listing backed by a vector; can be mutated between requests.
pub struct VecFetcher {
    items: Mutex<Vec<Item>>,
    failing: bool,
}

impl VecFetcher {
    pub fn with_items(count: usize) -> Self {
        let items = (1..=count)
            .map(|i| Item {
                name: format!("Organization {i:03}"),
            })
            .collect();
        Self {
            items: Mutex::new(items),
            failing: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            items: Mutex::new(Vec::new()),
            failing: true,
        }
    }

    pub fn push(&self, name: &str) {
        self.items.lock().expect("fetcher mutex poisoned").push(Item {
            name: name.to_string(),
        });
    }
}

#[async_trait]
impl ListingFetcher for VecFetcher {
    type Item = Item;

    async fn list_page(
        &self,
        _filter: &ListingFilter,
        page: u64,
        per_page: u64,
    ) -> Result<ListingPage<Item>, FetchError> {
        if self.failing {
            return Err(FetchError("database is down".to_string()));
        }
        let items = self.items.lock().expect("fetcher mutex poisoned");
        let skip = ((page - 1) * per_page) as usize;
        Ok(ListingPage {
            items: items.iter().skip(skip).take(per_page as usize).cloned().collect(),
            total_count: items.len() as u64,
        })
    }
}
