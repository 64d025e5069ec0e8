//! Header manipulation between client, proxy and upstream.
//!
//! # Responsibilities
//! - Build the outbound header set from an allowlist of inbound headers
//! - Inject the resolved upstream Authorization, never the caller's own
//! - Strip transport headers from relayed upstream responses
//!
//! # Design Decisions
//! - Allowlist, not denylist: unknown inbound headers never reach upstream
//! - Empty inbound values count as absent

use axum::http::{header, HeaderMap, HeaderName, HeaderValue};

/// Header names copied from the caller only when present.
const PASSTHROUGH: [HeaderName; 3] = [header::RANGE, header::REFERER, header::ORIGIN];

pub const X_VERSION: HeaderName = HeaderName::from_static("x-version");

/// Every header name the outbound set may contain.
pub const OUTBOUND_ALLOWLIST: [HeaderName; 7] = [
    header::USER_AGENT,
    header::ACCEPT,
    header::RANGE,
    header::REFERER,
    header::ORIGIN,
    header::AUTHORIZATION,
    X_VERSION,
];

/// Response headers owned by the proxy's own transport framing.
const STRIPPED_RESPONSE: [HeaderName; 3] = [
    header::CONTENT_ENCODING,
    header::TRANSFER_ENCODING,
    header::CONNECTION,
];

fn present<'a>(inbound: &'a HeaderMap, name: &HeaderName) -> Option<&'a HeaderValue> {
    inbound.get(name).filter(|v| !v.is_empty())
}

/// Derive upstream request headers from the inbound ones.
///
/// `authorization` is the already-resolved credential; an empty string means
/// no Authorization header is sent at all.
pub fn filter_headers(inbound: &HeaderMap, authorization: &str, default_user_agent: &str) -> HeaderMap {
    let mut outbound = HeaderMap::new();

    let user_agent = present(inbound, &header::USER_AGENT)
        .cloned()
        .or_else(|| HeaderValue::from_str(default_user_agent).ok());
    if let Some(ua) = user_agent {
        outbound.insert(header::USER_AGENT, ua);
    }

    let accept = present(inbound, &header::ACCEPT)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static("*/*"));
    outbound.insert(header::ACCEPT, accept);

    for name in PASSTHROUGH.iter().chain(std::iter::once(&X_VERSION)) {
        if let Some(value) = present(inbound, name) {
            outbound.insert(name.clone(), value.clone());
        }
    }

    if !authorization.is_empty() {
        match HeaderValue::from_str(authorization) {
            Ok(mut value) => {
                value.set_sensitive(true);
                outbound.insert(header::AUTHORIZATION, value);
            }
            Err(_) => tracing::warn!("Resolved credential is not a valid header value, omitting it"),
        }
    }

    outbound
}

/// Copy of upstream response headers minus transport framing headers.
pub fn strip_transport_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut headers = upstream.clone();
    for name in &STRIPPED_RESPONSE {
        headers.remove(name);
    }
    headers
}
