//! Governance settings.

use serde::{Deserialize, Serialize};

use crate::domain::{PageDescriptor, QuotaPolicy};

/// What to do when the counter store cannot be reached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Admit the request unmetered and log a warning.
    #[default]
    Open,
    /// Reject the request.
    Closed,
}

impl std::str::FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(FailurePolicy::Open),
            "closed" => Ok(FailurePolicy::Closed),
            other => Err(format!("unknown failure policy: {other}")),
        }
    }
}

/// Cross-origin settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allow_methods: Vec<String>,
    pub allow_headers: Vec<String>,
    pub expose_headers: Vec<String>,
    pub max_age_secs: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_methods: vec!["GET".into(), "POST".into(), "PUT".into()],
            allow_headers: vec![
                "Accept".into(),
                "Content-Type".into(),
                "If-None-Match".into(),
                "X-Api-Token".into(),
            ],
            expose_headers: vec![
                "ETag".into(),
                "Link".into(),
                "X-RateLimit-Limit".into(),
                "X-RateLimit-Remaining".into(),
            ],
            max_age_secs: 1_728_000,
        }
    }
}

/// Everything the request governor needs besides its ports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernorConfig {
    /// Prefix of every rate window key.
    pub namespace: String,
    pub quotas: QuotaPolicy,
    pub failure_policy: FailurePolicy,
    pub per_page: u64,
    pub cors: CorsConfig,
}

impl Default for GovernorConfig {
    fn default() -> Self {
        Self {
            namespace: "defender".to_string(),
            quotas: QuotaPolicy::default(),
            failure_policy: FailurePolicy::default(),
            per_page: PageDescriptor::DEFAULT_PER_PAGE,
            cors: CorsConfig::default(),
        }
    }
}
