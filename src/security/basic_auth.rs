//! Basic-Auth access gate.
//! Guards every route when a username or password is configured.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use subtle::ConstantTimeEq;

use crate::config::AuthConfig;
use crate::error::ProxyError;

/// Length-checked constant-time string comparison.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Decode `Authorization: Basic <base64>` into `(user, pass)`.
/// A missing colon means an empty password.
fn parse_basic(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let encoded = value.strip_prefix("Basic ")?;
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8_lossy(&decoded);

    Some(match decoded.split_once(':') {
        Some((user, pass)) => (user.to_string(), pass.to_string()),
        None => (decoded.into_owned(), String::new()),
    })
}

/// True when the request may pass the gate.
pub fn is_authorized(config: &AuthConfig, headers: &HeaderMap) -> bool {
    if !config.is_enabled() {
        return true;
    }
    let Some((user, pass)) = parse_basic(headers) else {
        return false;
    };
    // Both comparisons run regardless of the first result.
    let user_ok = constant_time_compare(&user, &config.basic_user);
    let pass_ok = constant_time_compare(&pass, &config.basic_pass);
    user_ok & pass_ok
}

pub async fn basic_auth_middleware(
    State(config): State<Arc<AuthConfig>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if is_authorized(&config, request.headers()) {
        return next.run(request).await;
    }

    tracing::warn!(
        path = %request.uri().path(),
        "Rejected request without valid Basic credentials"
    );
    ProxyError::Unauthorized.into_response()
}
