//! Request governance - the checks wrapped around every listing request.
//!
//! # Pipeline
//! ```text
//! request
//!     → requestor.rs   (token or client address → quota class)
//!     → cors.rs        (Origin → CORS headers, never blocks)
//!     → user_agent.rs  (reject blank User-Agent)
//!     → rate_limit.rs  (reject exhausted quota)
//!     → ListingFetcher (page N of the collection)
//!     → fingerprint.rs (ETag, 304 on matching If-None-Match)
//!     → pagination.rs  (Link header)
//! ```
//!
//! `governor.rs` runs the stages in that order.

mod config;
mod cors;
mod fingerprint;
mod governor;
mod headers;
mod pagination;
mod rate_limit;
mod requestor;
mod user_agent;

#[cfg(test)]
mod testing;

pub use config::{CorsConfig, FailurePolicy, GovernorConfig};
pub use cors::{CorsDecision, CorsPolicy};
pub use fingerprint::{CacheEvaluation, evaluate, fingerprint};
pub use governor::{GovernedResponse, InboundRequest, Outcome, Rejection, RequestGovernor, Stage};
pub use headers::{RequestHeaders, ResponseHeaders, names};
pub use pagination::{MAX_PAGE, Paginator, requested_page};
pub use rate_limit::{AdmitResult, Admission, PendingAdmission, RateLimiter};
pub use requestor::RequestorResolver;
pub use user_agent::validate as validate_user_agent;
