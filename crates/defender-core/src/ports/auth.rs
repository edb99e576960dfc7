//! API token resolution port.

use async_trait::async_trait;

use crate::domain::ApiApplication;

/// Maps an API token to the application it was issued to.
#[async_trait]
pub trait ApiTokenResolver: Send + Sync {
    /// Returns `Ok(None)` for tokens that were never issued.
    async fn resolve_token(&self, token: &str) -> Result<Option<ApiApplication>, AuthError>;
}

/// Token lookup errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Token backend unavailable: {0}")]
    Backend(String),
}
