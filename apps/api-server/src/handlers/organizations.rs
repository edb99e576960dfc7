//! Governed organization listing.

use actix_web::{HttpRequest, HttpResponse, web};

use crate::middleware::error::AppResult;
use crate::middleware::governance::{GovernedRequest, into_http_response, request_headers};
use crate::observability::RequestId;
use crate::state::AppState;

/// GET /api/organizations?page=N&keyword=...
#[tracing::instrument(name = "list_organizations", skip_all, fields(request_id = %request_id.as_str()))]
pub async fn list(
    state: web::Data<AppState>,
    request_id: RequestId,
    request: GovernedRequest,
) -> AppResult<HttpResponse> {
    let governed = state
        .governor
        .govern(&request.inbound, state.organizations.as_ref(), &request.filter)
        .await?;

    Ok(into_http_response(governed))
}

/// OPTIONS /api/organizations
///
/// Answers 200 either way; CORS headers appear only when an Origin was sent.
pub async fn preflight(state: web::Data<AppState>, req: HttpRequest) -> HttpResponse {
    let headers = state.governor.cors().preflight(&request_headers(&req));

    let mut builder = HttpResponse::Ok();
    for (name, value) in headers.iter() {
        builder.insert_header((name, value));
    }
    builder.finish()
}
