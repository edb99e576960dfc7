use chrono::{DateTime, Utc};

/// Port for obtaining the current wall-clock time.
///
/// Rate windows are calendar hours, so this is UTC wall time rather than a
/// monotonic instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
