use serde::{Deserialize, Serialize};

use super::ApiApplication;

/// Quota tier a requestor is metered against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuotaClass {
    Anonymous,
    Authenticated,
}

/// Hourly request limits per quota class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaPolicy {
    pub anonymous: u64,
    pub authenticated: u64,
}

impl Default for QuotaPolicy {
    fn default() -> Self {
        Self {
            anonymous: 60,
            authenticated: 5000,
        }
    }
}

impl QuotaPolicy {
    pub fn limit_for(&self, class: QuotaClass) -> u64 {
        match class {
            QuotaClass::Anonymous => self.anonymous,
            QuotaClass::Authenticated => self.authenticated,
        }
    }
}

/// The identity rate limits are tracked against.
///
/// Resolved fresh for every request and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requestor {
    /// No usable token: metered by client network address.
    Anonymous { addr: String },
    /// A valid token bound to an active application.
    Authenticated { application: ApiApplication },
}

impl Requestor {
    /// Counter partitioning key.
    pub fn key(&self) -> &str {
        match self {
            Requestor::Anonymous { addr } => addr,
            Requestor::Authenticated { application } => &application.api_token,
        }
    }

    pub fn quota_class(&self) -> QuotaClass {
        match self {
            Requestor::Anonymous { .. } => QuotaClass::Anonymous,
            Requestor::Authenticated { .. } => QuotaClass::Authenticated,
        }
    }

    pub fn quota_limit(&self, policy: &QuotaPolicy) -> u64 {
        policy.limit_for(self.quota_class())
    }
}
