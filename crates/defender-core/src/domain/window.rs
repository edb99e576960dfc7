use std::time::Duration;

use chrono::{DateTime, DurationRound, TimeDelta, Utc};

/// A fixed one-hour accounting bucket for one requestor.
///
/// The count itself lives in the counter store; this only names the bucket
/// and its boundaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateWindow {
    pub key: String,
    pub started_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl RateWindow {
    pub const LENGTH: Duration = Duration::from_secs(60 * 60);

    /// Window containing `now`, keyed `<namespace>:<requestor>:<YYYY-MM-DDTHH>`.
    pub fn current(namespace: &str, requestor_key: &str, now: DateTime<Utc>) -> Self {
        let started_at = now.duration_trunc(TimeDelta::hours(1)).unwrap_or(now);
        let expires_at = started_at + TimeDelta::hours(1);
        let key = format!(
            "{}:{}:{}",
            namespace,
            requestor_key,
            started_at.format("%Y-%m-%dT%H")
        );

        Self {
            key,
            started_at,
            expires_at,
        }
    }

    /// Time left until the window resets.
    pub fn remaining_at(&self, now: DateTime<Utc>) -> Duration {
        (self.expires_at - now).to_std().unwrap_or(Duration::ZERO)
    }
}
