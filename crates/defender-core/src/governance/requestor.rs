//! Requestor resolution.

use std::sync::Arc;

use crate::domain::Requestor;
use crate::ports::ApiTokenResolver;

use super::headers::{RequestHeaders, names};

/// Derives who a request is metered against.
///
/// Never fails: a token that is unknown, inactive or cannot be checked
/// leaves the caller anonymous.
pub struct RequestorResolver {
    tokens: Arc<dyn ApiTokenResolver>,
}

impl RequestorResolver {
    pub fn new(tokens: Arc<dyn ApiTokenResolver>) -> Self {
        Self { tokens }
    }

    pub async fn resolve(&self, headers: &RequestHeaders, client_addr: &str) -> Requestor {
        let anonymous = || Requestor::Anonymous {
            addr: client_addr.to_string(),
        };

        let Some(token) = presented_token(headers) else {
            return anonymous();
        };

        match self.tokens.resolve_token(token).await {
            Ok(Some(application)) if application.active => {
                tracing::debug!(application = %application.name, "Authenticated requestor");
                Requestor::Authenticated { application }
            }
            Ok(Some(application)) => {
                tracing::debug!(
                    application = %application.name,
                    "Token belongs to an inactive application"
                );
                anonymous()
            }
            Ok(None) => {
                tracing::debug!("Unrecognized API token");
                anonymous()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Token lookup failed, treating requestor as anonymous");
                anonymous()
            }
        }
    }
}

/// `X-Api-Token`, else an `Authorization: Bearer` credential.
fn presented_token(headers: &RequestHeaders) -> Option<&str> {
    headers.get_non_blank(names::X_API_TOKEN).or_else(|| {
        headers
            .get_non_blank(names::AUTHORIZATION)
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
    })
}
