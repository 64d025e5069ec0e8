//! Route handlers.
//!
//! Forwarding handlers share one flow: resolve the target, build the
//! outbound request from filtered headers, call the upstream, then hand the
//! result to the relay. Failures become [`ProxyError`] responses at the end
//! of each handler, after being logged with request ID, route and target.

use std::time::{Duration, Instant};

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{header, HeaderMap, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::credentials::{resolve_authorization, status::token_status, TokenStatus};
use crate::error::{ProxyError, ProxyResult};
use crate::http::request::request_id;
use crate::http::response::{relay_buffered, relay_stream};
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::routing::{FixedRoute, RouteKind};
use crate::security::headers::filter_headers;
use crate::upstream::{BodyMode, UpstreamRequest};

#[derive(Debug, Deserialize)]
pub struct ViewParams {
    pub url: Option<String>,
}

pub async fn landing_page(State(state): State<AppState>) -> Html<String> {
    Html(state.index_html.to_string())
}

pub async fn backend_token_status(State(state): State<AppState>) -> Response {
    let status = token_status(&state.config.credentials.default_token);
    tracing::debug!(status = status.as_str(), "Backend token status checked");

    match status {
        TokenStatus::NotConfigured => (
            StatusCode::NO_CONTENT,
            [(
                header::RETRY_AFTER,
                state.config.credentials.retry_after_secs.to_string(),
            )],
        )
            .into_response(),
        TokenStatus::Valid => StatusCode::NO_CONTENT.into_response(),
        TokenStatus::Expired => (
            StatusCode::OK,
            Json(json!({
                "code": "backend_token_expired",
                "message": "backend token has expired",
            })),
        )
            .into_response(),
    }
}

pub async fn api_proxy(State(state): State<AppState>, uri: Uri, headers: HeaderMap) -> Response {
    forward_buffered(&state, FixedRoute::Api, &uri, &headers).await
}

pub async fn file_proxy(State(state): State<AppState>, uri: Uri, headers: HeaderMap) -> Response {
    forward_buffered(&state, FixedRoute::File, &uri, &headers).await
}

pub async fn view_stream(
    State(state): State<AppState>,
    query: Result<Query<ViewParams>, QueryRejection>,
    headers: HeaderMap,
) -> Response {
    let start = Instant::now();
    let request_id = request_id(&headers);
    let kind = RouteKind::Stream;

    let target = match query {
        Ok(Query(params)) => state.router.stream_target(params.url.as_deref()),
        Err(rejection) => Err(ProxyError::BadRequest(rejection.body_text())),
    };
    let target = match target {
        Ok(url) => url.to_string(),
        Err(err) => return finish(kind, &request_id, "-", start, Err(err)),
    };

    tracing::info!(request_id = %request_id, route = kind.as_str(), target = %target, "Streaming upstream");

    let request = outbound(&state, &headers, target.clone(), BodyMode::Streamed);
    let result = match state.client.get(request).await {
        Ok(upstream) => Ok(relay_stream(upstream, state.config.upstream.stream_chunk_size)),
        Err(err) => Err(err.into()),
    };
    finish(kind, &request_id, &target, start, result)
}

pub async fn not_found(uri: Uri) -> ProxyError {
    tracing::debug!(path = %uri.path(), "No route matched");
    ProxyError::NotFound
}

async fn forward_buffered(
    state: &AppState,
    route: FixedRoute,
    uri: &Uri,
    headers: &HeaderMap,
) -> Response {
    let start = Instant::now();
    let request_id = request_id(headers);
    let kind = RouteKind::from(route);
    let path_and_query = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
    let target = state.router.target(route, path_and_query);

    tracing::info!(request_id = %request_id, route = kind.as_str(), target = %target, "Proxying request");

    let request = outbound(state, headers, target.clone(), BodyMode::Buffered);
    let result = match state.client.get(request).await {
        Ok(upstream) => relay_buffered(upstream).await,
        Err(err) => Err(err.into()),
    };
    finish(kind, &request_id, &target, start, result)
}

/// Build the upstream request from the inbound headers.
fn outbound(state: &AppState, inbound: &HeaderMap, url: String, mode: BodyMode) -> UpstreamRequest {
    let upstream = &state.config.upstream;
    let authorization = resolve_authorization(inbound, &state.config.credentials.default_token);
    UpstreamRequest {
        url,
        headers: filter_headers(inbound, &authorization, &upstream.default_user_agent),
        mode,
        timeout: Duration::from_secs(upstream.timeout_secs),
    }
}

fn finish(
    kind: RouteKind,
    request_id: &str,
    target: &str,
    start: Instant,
    result: ProxyResult<Response>,
) -> Response {
    let response = match result {
        Ok(response) => response,
        Err(err) => {
            if err.status().is_server_error() {
                tracing::error!(
                    request_id = %request_id,
                    route = kind.as_str(),
                    target = %target,
                    error = %err,
                    "Upstream error"
                );
                metrics::record_upstream_error(kind.as_str(), err.kind());
            } else {
                tracing::warn!(
                    request_id = %request_id,
                    route = kind.as_str(),
                    error = %err,
                    "Rejected request"
                );
            }
            err.into_response()
        }
    };

    metrics::record_request(kind.as_str(), response.status().as_u16(), start);
    response
}
