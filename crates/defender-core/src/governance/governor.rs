//! The request governor: one pass through every governance stage.
//!
//! ```text
//! Start ──UA ok──▶ UaChecked ──quota ok──▶ RateChecked ──▶ Fetched ──▶ CacheEvaluated ──▶ Finalized
//!   │                  │
//!   ▼                  ▼
//! Rejected(MissingUserAgent)   Rejected(RateLimitExceeded)
//! ```
//!
//! Stages run strictly in order with no retries. A rejection skips the fetch
//! and cache stages but keeps the CORS headers and whatever quota headers
//! were known when it happened.

use std::sync::Arc;

use crate::domain::Requestor;
use crate::error::GovernanceError;
use crate::ports::{ApiTokenResolver, Clock, CounterStore, ListingFetcher, ListingFilter};

use super::config::GovernorConfig;
use super::cors::CorsPolicy;
use super::fingerprint;
use super::headers::{RequestHeaders, ResponseHeaders, names};
use super::pagination::Paginator;
use super::rate_limit::{AdmitResult, Admission, RateLimiter};
use super::requestor::RequestorResolver;
use super::user_agent;

/// The parts of an HTTP request the governor looks at.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    pub headers: RequestHeaders,
    /// Client network address, used as the anonymous counter key.
    pub client_addr: String,
    /// Absolute request URL, query included. Link targets are derived from it.
    pub url: String,
    /// 1-based page requested.
    pub page: u64,
}

/// Governor states. A response records the last one reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    UaChecked,
    RateChecked,
    Fetched,
    CacheEvaluated,
    Finalized,
}

/// Why a request was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    MissingUserAgent,
    RateLimitExceeded,
    /// Counter store down under a fail-closed policy.
    CounterStoreUnavailable,
}

impl Rejection {
    /// Client-facing description. Fixed strings only.
    pub fn description(&self) -> &'static str {
        match self {
            Rejection::MissingUserAgent => "Missing or invalid User Agent string.",
            Rejection::RateLimitExceeded => "Rate limit exceeded.",
            Rejection::CounterStoreUnavailable => "Rate limiting is temporarily unavailable.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// 200 with the serialized page.
    Fresh { body: Vec<u8> },
    /// 304, empty body.
    NotModified,
    Rejected(Rejection),
}

/// Final decision plus every header the governor wants on the response.
#[derive(Debug, Clone)]
pub struct GovernedResponse {
    pub outcome: Outcome,
    pub headers: ResponseHeaders,
    pub stage: Stage,
}

impl GovernedResponse {
    fn rejected(rejection: Rejection, stage: Stage, headers: ResponseHeaders) -> Self {
        Self {
            outcome: Outcome::Rejected(rejection),
            headers,
            stage,
        }
    }
}

/// Orchestrates requestor resolution, CORS, the User-Agent gate, rate
/// limiting, fingerprinting and pagination.
pub struct RequestGovernor {
    resolver: RequestorResolver,
    limiter: RateLimiter,
    cors: CorsPolicy,
    paginator: Paginator,
}

impl RequestGovernor {
    pub fn new(
        config: GovernorConfig,
        store: Arc<dyn CounterStore>,
        tokens: Arc<dyn ApiTokenResolver>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            resolver: RequestorResolver::new(tokens),
            limiter: RateLimiter::new(
                store,
                clock,
                config.namespace,
                config.quotas,
                config.failure_policy,
            ),
            cors: CorsPolicy::new(config.cors),
            paginator: Paginator::new(config.per_page),
        }
    }

    pub fn cors(&self) -> &CorsPolicy {
        &self.cors
    }

    async fn resolve_requestor(&self, request: &InboundRequest) -> Requestor {
        self.resolver
            .resolve(&request.headers, &request.client_addr)
            .await
    }

    /// Run one listing request through every stage.
    ///
    /// Only an upstream fetch failure (or a body that fails to serialize) is
    /// returned as an error; every rejection is a regular `GovernedResponse`.
    #[tracing::instrument(
        name = "govern",
        skip_all,
        fields(client = %request.client_addr, page = request.page)
    )]
    pub async fn govern<F>(
        &self,
        request: &InboundRequest,
        fetcher: &F,
        filter: &ListingFilter,
    ) -> Result<GovernedResponse, GovernanceError>
    where
        F: ListingFetcher + ?Sized,
    {
        let mut headers = ResponseHeaders::new();
        let requestor = self.resolve_requestor(request).await;
        self.cors
            .decide(request.headers.get(names::ORIGIN))
            .apply(&mut headers);

        if !user_agent::validate(&request.headers) {
            tracing::warn!("Rejected request without User-Agent");
            return Ok(GovernedResponse::rejected(
                Rejection::MissingUserAgent,
                Stage::Start,
                headers,
            ));
        }

        let pending = match self.limiter.check(&requestor).await {
            Admission::Pending(pending) => Some(pending),
            Admission::Exhausted(quota) => {
                write_quota(&mut headers, &quota);
                headers.set(names::RETRY_AFTER, quota.reset_after.as_secs().to_string());
                return Ok(GovernedResponse::rejected(
                    Rejection::RateLimitExceeded,
                    Stage::UaChecked,
                    headers,
                ));
            }
            Admission::Unmetered(quota) => {
                write_quota(&mut headers, &quota);
                None
            }
            Admission::Unavailable(_) => {
                return Ok(GovernedResponse::rejected(
                    Rejection::CounterStoreUnavailable,
                    Stage::UaChecked,
                    headers,
                ));
            }
        };

        let page = fetcher
            .list_page(filter, request.page, self.paginator.per_page())
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Listing fetch failed"))?;

        let body = serde_json::to_vec(&page.items)?;
        let evaluation = fingerprint::evaluate(&body, request.headers.get(names::IF_NONE_MATCH));

        // A 304 replays an earlier response and is not counted.
        if let Some(pending) = pending {
            let quota = if evaluation.not_modified {
                pending.status()
            } else {
                self.limiter.commit(pending).await
            };
            write_quota(&mut headers, &quota);
            if !quota.allowed {
                // Concurrent requests filled the window after `check`.
                headers.set(names::RETRY_AFTER, quota.reset_after.as_secs().to_string());
                return Ok(GovernedResponse::rejected(
                    Rejection::RateLimitExceeded,
                    Stage::UaChecked,
                    headers,
                ));
            }
        }

        headers.set(names::ETAG, evaluation.fingerprint);
        let descriptor = self.paginator.describe(request.page, page.total_count);
        if let Some(link) = self.paginator.build_links(&request.url, &descriptor) {
            headers.set(names::LINK, link);
        }

        let outcome = if evaluation.not_modified {
            Outcome::NotModified
        } else {
            Outcome::Fresh { body }
        };
        tracing::debug!(
            not_modified = evaluation.not_modified,
            total_count = page.total_count,
            "Request governed"
        );

        Ok(GovernedResponse {
            outcome,
            headers,
            stage: Stage::Finalized,
        })
    }
}

fn write_quota(headers: &mut ResponseHeaders, quota: &AdmitResult) {
    headers.set(names::X_RATELIMIT_LIMIT, quota.limit.to_string());
    headers.set(names::X_RATELIMIT_REMAINING, quota.remaining.to_string());
}
