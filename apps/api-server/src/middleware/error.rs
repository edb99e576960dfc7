//! Error handling - every failure renders as `{"description": ...}`.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use defender_core::GovernanceError;
use defender_core::governance::Rejection;
use defender_shared::ErrorResponse;
use std::fmt;

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    MissingUserAgent,
    RateLimitExceeded,
    QuotaUnavailable,
    NotFound,
    Internal(String),
}

impl AppError {
    /// Client-facing body. Internal details never reach it.
    pub fn body(&self) -> ErrorResponse {
        match self {
            AppError::MissingUserAgent => {
                ErrorResponse::new(Rejection::MissingUserAgent.description())
            }
            AppError::RateLimitExceeded => {
                ErrorResponse::new(Rejection::RateLimitExceeded.description())
            }
            AppError::QuotaUnavailable => {
                ErrorResponse::new(Rejection::CounterStoreUnavailable.description())
            }
            AppError::NotFound => ErrorResponse::not_found(),
            AppError::Internal(_) => ErrorResponse::internal_error(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::MissingUserAgent => write!(f, "Missing User-Agent"),
            AppError::RateLimitExceeded => write!(f, "Rate limit exceeded"),
            AppError::QuotaUnavailable => write!(f, "Counter store unavailable"),
            AppError::NotFound => write!(f, "Not found"),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingUserAgent => StatusCode::FORBIDDEN,
            AppError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            AppError::QuotaUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let AppError::Internal(detail) = self {
            tracing::error!("Internal error: {}", detail);
        }

        HttpResponse::build(self.status_code()).json(self.body())
    }
}

impl From<Rejection> for AppError {
    fn from(rejection: Rejection) -> Self {
        match rejection {
            Rejection::MissingUserAgent => AppError::MissingUserAgent,
            Rejection::RateLimitExceeded => AppError::RateLimitExceeded,
            Rejection::CounterStoreUnavailable => AppError::QuotaUnavailable,
        }
    }
}

impl From<GovernanceError> for AppError {
    fn from(err: GovernanceError) -> Self {
        match err {
            GovernanceError::CounterStoreUnavailable(e) => {
                tracing::warn!(error = %e, "Counter store unavailable");
                AppError::QuotaUnavailable
            }
            GovernanceError::UpstreamFetch(e) => AppError::Internal(format!("listing fetch: {e}")),
            GovernanceError::Serialization(e) => AppError::Internal(format!("serialization: {e}")),
        }
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejections_map_to_statuses() {
        let cases = [
            (Rejection::MissingUserAgent, StatusCode::FORBIDDEN),
            (Rejection::RateLimitExceeded, StatusCode::TOO_MANY_REQUESTS),
            (Rejection::CounterStoreUnavailable, StatusCode::SERVICE_UNAVAILABLE),
        ];
        for (rejection, status) in cases {
            let error = AppError::from(rejection);
            assert_eq!(error.status_code(), status);
            assert_eq!(error.body().description, rejection.description());
        }
    }

    #[test]
    fn test_internal_detail_is_not_exposed() {
        let error = AppError::Internal("connection refused at 10.0.0.3".to_string());
        assert_eq!(error.body().description, "Internal server error.");
    }
}
