//! Boundary between actix requests/responses and the request governor.

use std::future::{Ready, ready};

use actix_web::dev::Payload;
use actix_web::http::StatusCode;
use actix_web::http::header::ContentType;
use actix_web::{FromRequest, HttpRequest, HttpResponse, ResponseError, web};
use serde::Deserialize;

use defender_core::governance::{RequestHeaders, requested_page};
use defender_core::ports::ListingFilter;
use defender_core::{GovernedResponse, InboundRequest, Outcome};

use crate::middleware::error::AppError;
use crate::state::AppState;

/// Query parameters understood by governed listings.
#[derive(Debug, Default, Deserialize)]
pub struct ListingQuery {
    pub page: Option<String>,
    pub keyword: Option<String>,
}

/// A listing request, translated for the governor.
pub struct GovernedRequest {
    pub inbound: InboundRequest,
    pub filter: ListingFilter,
}

/// Copy every header with a textual value.
pub fn request_headers(req: &HttpRequest) -> RequestHeaders {
    let mut headers = RequestHeaders::new();
    for (name, value) in req.headers() {
        if let Ok(value) = value.to_str() {
            headers.insert(name.as_str(), value);
        }
    }
    headers
}

/// Absolute URL of the request, query included.
fn request_url(req: &HttpRequest, public_base_url: Option<&str>) -> String {
    let path_and_query = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    match public_base_url {
        Some(base) => format!("{}{}", base.trim_end_matches('/'), path_and_query),
        None => {
            let info = req.connection_info();
            format!("{}://{}{}", info.scheme(), info.host(), path_and_query)
        }
    }
}

/// Address anonymous requests are metered by.
///
/// Forwarding headers are client-controlled, so they are read only when the
/// deployment says a proxy in front rewrites them.
fn client_addr(req: &HttpRequest, trust_forwarded_for: bool) -> String {
    if trust_forwarded_for {
        if let Some(addr) = req.connection_info().realip_remote_addr() {
            return addr.to_string();
        }
    }
    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

impl GovernedRequest {
    fn from_http(
        req: &HttpRequest,
        public_base_url: Option<&str>,
        trust_forwarded_for: bool,
    ) -> Self {
        // Malformed query strings are treated as empty.
        let query = web::Query::<ListingQuery>::from_query(req.query_string())
            .map(web::Query::into_inner)
            .unwrap_or_default();

        let client_addr = client_addr(req, trust_forwarded_for);

        Self {
            inbound: InboundRequest {
                headers: request_headers(req),
                client_addr,
                url: request_url(req, public_base_url),
                page: requested_page(query.page.as_deref()),
            },
            filter: ListingFilter {
                keyword: query.keyword.filter(|k| !k.trim().is_empty()),
            },
        }
    }
}

impl FromRequest for GovernedRequest {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let result = match req.app_data::<web::Data<AppState>>() {
            Some(state) => Ok(Self::from_http(
                req,
                state.public_base_url.as_deref(),
                state.trust_forwarded_for,
            )),
            None => Err(AppError::Internal("application state not configured".to_string()).into()),
        };
        ready(result)
    }
}

/// Render a governed response: headers in governor order, then the body.
pub fn into_http_response(governed: GovernedResponse) -> HttpResponse {
    let GovernedResponse {
        outcome, headers, ..
    } = governed;

    let status = match &outcome {
        Outcome::Fresh { .. } => StatusCode::OK,
        Outcome::NotModified => StatusCode::NOT_MODIFIED,
        Outcome::Rejected(rejection) => AppError::from(*rejection).status_code(),
    };

    let mut builder = HttpResponse::build(status);
    for (name, value) in headers.iter() {
        builder.insert_header((name, value));
    }

    match outcome {
        Outcome::Fresh { body } => builder.content_type(ContentType::json()).body(body),
        Outcome::NotModified => builder.finish(),
        Outcome::Rejected(rejection) => builder.json(AppError::from(rejection).body()),
    }
}
