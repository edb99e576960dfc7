use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered API client. Its token lifts the caller into the
/// authenticated quota class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiApplication {
    pub id: Uuid,
    pub name: String,
    pub api_token: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl ApiApplication {
    /// Register a new, active application with the given token.
    pub fn new(name: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            api_token: api_token.into(),
            active: true,
            created_at: Utc::now(),
        }
    }

    pub fn deactivated(mut self) -> Self {
        self.active = false;
        self
    }
}
