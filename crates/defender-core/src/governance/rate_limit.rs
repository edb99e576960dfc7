//! Fixed-window rate limiting over the shared counter store.
//!
//! Admission is split in two: `check` reads the window count and decides,
//! `commit` spends one unit of quota. The governor commits only for fresh
//! responses, so a 304 replay never costs quota. `admit` runs both in one
//! call for callers without a cache stage.
//!
//! `check` is advisory under concurrency. The authoritative decision is the
//! store's conditional increment in `commit`, so a window never counts past
//! its limit no matter how many requests passed `check` together.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::domain::{QuotaPolicy, RateWindow, Requestor};
use crate::error::GovernanceError;
use crate::ports::{Clock, CounterStore, CounterStoreError};

use super::config::FailurePolicy;

/// Quota state reported back to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AdmitResult {
    pub allowed: bool,
    pub limit: u64,
    pub remaining: u64,
    /// Time until the current window resets.
    pub reset_after: Duration,
}

/// Admitted but not yet counted.
#[derive(Debug, Clone)]
pub struct PendingAdmission {
    window: RateWindow,
    limit: u64,
    observed: u64,
    reset_after: Duration,
}

impl PendingAdmission {
    /// Quota as seen at check time, before this request is counted.
    pub fn status(&self) -> AdmitResult {
        AdmitResult {
            allowed: true,
            limit: self.limit,
            remaining: self.limit.saturating_sub(self.observed),
            reset_after: self.reset_after,
        }
    }

    pub fn window(&self) -> &RateWindow {
        &self.window
    }
}

/// Outcome of `RateLimiter::check`.
#[derive(Debug)]
pub enum Admission {
    /// Within quota; call `commit` once the request is served.
    Pending(PendingAdmission),
    /// Window count has reached the limit.
    Exhausted(AdmitResult),
    /// Counter store unreachable under `FailurePolicy::Open`.
    Unmetered(AdmitResult),
    /// Counter store unreachable under `FailurePolicy::Closed`.
    Unavailable(CounterStoreError),
}

/// Per-requestor hourly quota enforcement.
///
/// Holds no counts of its own; every read and increment goes to the store.
pub struct RateLimiter {
    store: Arc<dyn CounterStore>,
    clock: Arc<dyn Clock>,
    namespace: String,
    quotas: QuotaPolicy,
    failure_policy: FailurePolicy,
}

impl RateLimiter {
    pub fn new(
        store: Arc<dyn CounterStore>,
        clock: Arc<dyn Clock>,
        namespace: impl Into<String>,
        quotas: QuotaPolicy,
        failure_policy: FailurePolicy,
    ) -> Self {
        Self {
            store,
            clock,
            namespace: namespace.into(),
            quotas,
            failure_policy,
        }
    }

    /// Read the current window and decide without spending quota.
    pub async fn check(&self, requestor: &Requestor) -> Admission {
        let now = self.clock.now();
        let window = RateWindow::current(&self.namespace, requestor.key(), now);
        let limit = requestor.quota_limit(&self.quotas);
        let reset_after = window.remaining_at(now);

        let observed = match self.store.get(&window.key).await {
            Ok(count) => count.unwrap_or(0),
            Err(e) => return self.on_store_failure(e, limit, reset_after),
        };

        if observed >= limit {
            tracing::warn!(
                window = %window.key,
                count = observed,
                limit,
                "Rate limit exceeded"
            );
            return Admission::Exhausted(AdmitResult {
                allowed: false,
                limit,
                remaining: 0,
                reset_after,
            });
        }

        tracing::debug!(window = %window.key, count = observed, limit, "Request admitted");
        Admission::Pending(PendingAdmission {
            window,
            limit,
            observed,
            reset_after,
        })
    }

    /// Count an admitted request, at most once.
    ///
    /// Returns `allowed: false` when concurrent requests used up the window
    /// after `check`; the count is then left unchanged.
    pub async fn commit(&self, pending: PendingAdmission) -> AdmitResult {
        match self
            .store
            .increment_below(&pending.window.key, pending.limit, RateWindow::LENGTH)
            .await
        {
            Ok(Some(count)) => AdmitResult {
                allowed: true,
                limit: pending.limit,
                remaining: pending.limit.saturating_sub(count),
                reset_after: pending.reset_after,
            },
            Ok(None) => {
                tracing::warn!(
                    window = %pending.window.key,
                    limit = pending.limit,
                    "Rate limit reached by concurrent requests"
                );
                AdmitResult {
                    allowed: false,
                    limit: pending.limit,
                    remaining: 0,
                    reset_after: pending.reset_after,
                }
            }
            Err(e) => {
                // Store failed between check and commit: the request stays
                // uncounted and is reported with the pre-check view.
                tracing::warn!(
                    window = %pending.window.key,
                    error = %e,
                    "Counter increment failed, request left uncounted"
                );
                pending.status()
            }
        }
    }

    /// Check and commit in one step.
    pub async fn admit(&self, requestor: &Requestor) -> Result<AdmitResult, GovernanceError> {
        match self.check(requestor).await {
            Admission::Pending(pending) => Ok(self.commit(pending).await),
            Admission::Exhausted(result) | Admission::Unmetered(result) => Ok(result),
            Admission::Unavailable(e) => Err(GovernanceError::CounterStoreUnavailable(e)),
        }
    }

    fn on_store_failure(
        &self,
        error: CounterStoreError,
        limit: u64,
        reset_after: Duration,
    ) -> Admission {
        match self.failure_policy {
            FailurePolicy::Open => {
                tracing::warn!(error = %error, "Counter store unavailable, failing open");
                Admission::Unmetered(AdmitResult {
                    allowed: true,
                    limit,
                    remaining: limit,
                    reset_after,
                })
            }
            FailurePolicy::Closed => {
                tracing::error!(error = %error, "Counter store unavailable, failing closed");
                Admission::Unavailable(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ApiApplication;
    use crate::governance::testing::{ManualClock, MemoryCounters, YieldingCounters};

    fn anonymous() -> Requestor {
        Requestor::Anonymous {
            addr: "127.0.0.1".to_string(),
        }
    }

    fn limiter(store: Arc<MemoryCounters>, clock: Arc<ManualClock>) -> RateLimiter {
        RateLimiter::new(
            store,
            clock,
            "defender",
            QuotaPolicy::default(),
            FailurePolicy::Open,
        )
    }

    #[tokio::test]
    async fn test_remaining_decreases_until_rejected() {
        let store = Arc::new(MemoryCounters::new());
        let clock = Arc::new(ManualClock::at(2024, 3, 9, 14, 5));
        let limiter = limiter(store, clock);

        for expected in (0..60).rev() {
            let result = limiter.admit(&anonymous()).await.unwrap();
            assert!(result.allowed);
            assert_eq!(result.limit, 60);
            assert_eq!(result.remaining, expected);
        }

        let result = limiter.admit(&anonymous()).await.unwrap();
        assert!(!result.allowed);
        assert_eq!(result.remaining, 0);
    }

    #[tokio::test]
    async fn test_rejection_does_not_increment() {
        let store = Arc::new(MemoryCounters::new());
        let clock = Arc::new(ManualClock::at(2024, 3, 9, 14, 5));
        store.seed("defender:127.0.0.1:2024-03-09T14", 60);
        let limiter = limiter(store.clone(), clock);

        assert!(!limiter.admit(&anonymous()).await.unwrap().allowed);
        assert_eq!(store.value("defender:127.0.0.1:2024-03-09T14"), Some(60));
    }

    #[tokio::test]
    async fn test_new_window_resets_remaining() {
        let store = Arc::new(MemoryCounters::new());
        let clock = Arc::new(ManualClock::at(2024, 3, 9, 14, 5));
        store.seed("defender:127.0.0.1:2024-03-09T14", 60);
        let limiter = limiter(store, clock.clone());

        assert!(!limiter.admit(&anonymous()).await.unwrap().allowed);

        clock.advance_minutes(55);
        let result = limiter.admit(&anonymous()).await.unwrap();
        assert!(result.allowed);
        assert_eq!(result.remaining, 59);
    }

    #[tokio::test]
    async fn test_authenticated_requestor_gets_larger_quota() {
        let store = Arc::new(MemoryCounters::new());
        let clock = Arc::new(ManualClock::at(2024, 3, 9, 14, 5));
        let limiter = limiter(store.clone(), clock);
        let requestor = Requestor::Authenticated {
            application: ApiApplication::new("test app", "tok"),
        };

        let result = limiter.admit(&requestor).await.unwrap();
        assert_eq!(result.limit, 5000);
        assert_eq!(result.remaining, 4999);
        assert_eq!(store.value("defender:tok:2024-03-09T14"), Some(1));
    }

    #[tokio::test]
    async fn test_check_alone_spends_nothing() {
        let store = Arc::new(MemoryCounters::new());
        let clock = Arc::new(ManualClock::at(2024, 3, 9, 14, 5));
        let limiter = limiter(store.clone(), clock);

        let Admission::Pending(pending) = limiter.check(&anonymous()).await else {
            panic!("expected pending admission");
        };
        assert_eq!(pending.status().remaining, 60);
        assert_eq!(store.value(&pending.window().key), None);

        let committed = limiter.commit(pending).await;
        assert_eq!(committed.remaining, 59);
    }

    #[tokio::test]
    async fn test_reset_after_counts_down_to_window_end() {
        let store = Arc::new(MemoryCounters::new());
        let clock = Arc::new(ManualClock::at(2024, 3, 9, 14, 45));
        let limiter = limiter(store, clock);

        let result = limiter.admit(&anonymous()).await.unwrap();
        assert_eq!(result.reset_after, Duration::from_secs(15 * 60));
    }

    #[tokio::test]
    async fn test_store_failure_fails_open_by_default() {
        let store = Arc::new(MemoryCounters::failing());
        let clock = Arc::new(ManualClock::at(2024, 3, 9, 14, 5));
        let limiter = limiter(store, clock);

        let result = limiter.admit(&anonymous()).await.unwrap();
        assert!(result.allowed);
        assert_eq!(result.remaining, 60);
    }

    #[tokio::test]
    async fn test_store_failure_can_fail_closed() {
        let store = Arc::new(MemoryCounters::failing());
        let clock = Arc::new(ManualClock::at(2024, 3, 9, 14, 5));
        let limiter = RateLimiter::new(
            store,
            clock,
            "defender",
            QuotaPolicy::default(),
            FailurePolicy::Closed,
        );

        assert!(matches!(
            limiter.check(&anonymous()).await,
            Admission::Unavailable(CounterStoreError::Connection(_))
        ));
        let err = limiter.admit(&anonymous()).await.unwrap_err();
        assert!(matches!(err, GovernanceError::CounterStoreUnavailable(_)));
    }

    #[tokio::test]
    async fn test_concurrent_admissions_count_every_request() {
        let store = Arc::new(MemoryCounters::new());
        let clock = Arc::new(ManualClock::at(2024, 3, 9, 14, 5));
        let limiter = limiter(store.clone(), clock);
        let requestor = anonymous();

        let results =
            futures::future::join_all((0..20).map(|_| limiter.admit(&requestor))).await;

        assert!(results.iter().all(|r| r.as_ref().unwrap().allowed));
        assert_eq!(store.value("defender:127.0.0.1:2024-03-09T14"), Some(20));
    }

    #[tokio::test]
    async fn test_interleaved_admissions_never_exceed_the_limit() {
        let store = Arc::new(YieldingCounters::new());
        store.inner().seed("defender:127.0.0.1:2024-03-09T14", 55);
        let clock = Arc::new(ManualClock::at(2024, 3, 9, 14, 5));
        let limiter = RateLimiter::new(
            store.clone(),
            clock,
            "defender",
            QuotaPolicy::default(),
            FailurePolicy::Open,
        );
        let requestor = anonymous();

        let results =
            futures::future::join_all((0..20).map(|_| limiter.admit(&requestor))).await;

        let admitted = results
            .iter()
            .filter(|r| r.as_ref().unwrap().allowed)
            .count();
        assert_eq!(admitted, 5);
        assert_eq!(
            store.inner().value("defender:127.0.0.1:2024-03-09T14"),
            Some(60)
        );
    }

    #[tokio::test]
    async fn test_commit_after_window_filled_is_refused() {
        let store = Arc::new(MemoryCounters::new());
        let clock = Arc::new(ManualClock::at(2024, 3, 9, 14, 5));
        let limiter = limiter(store.clone(), clock);

        let Admission::Pending(pending) = limiter.check(&anonymous()).await else {
            panic!("expected pending admission");
        };
        store.seed(&pending.window().key, 60);

        let result = limiter.commit(pending).await;
        assert!(!result.allowed);
        assert_eq!(result.remaining, 0);
        assert_eq!(store.value("defender:127.0.0.1:2024-03-09T14"), Some(60));
    }
}
