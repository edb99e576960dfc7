//! Wall-clock adapter.

use chrono::{DateTime, Utc};

use defender_core::ports::Clock;

/// System clock backed by `Utc::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
