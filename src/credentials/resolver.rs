//! Upstream authorization resolution.
//!
//! A caller may override the server's credential per request through the
//! `CustomizedToken` header. Otherwise the configured default is used.
//! Whatever wins is normalized to `Bearer <token>`.

use axum::http::HeaderMap;

/// Header carrying a caller-supplied upstream credential.
pub const CUSTOMIZED_TOKEN: &str = "customizedtoken";

/// Trim `value` and make sure it carries exactly one `Bearer ` prefix.
/// Returns an empty string for blank input.
pub fn normalize_bearer(value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        return String::new();
    }
    if strip_bearer(value).is_some() {
        value.to_string()
    } else {
        format!("Bearer {value}")
    }
}

/// The token part after a case-insensitive `Bearer` scheme and its whitespace.
pub fn strip_bearer(value: &str) -> Option<&str> {
    let scheme = value.get(..6)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let rest = &value[6..];
    let token = rest.trim_start();
    // "Bearer" must be followed by whitespace, not glued to the token.
    (token.len() < rest.len()).then_some(token)
}

/// Pick the credential for one outbound call.
pub fn resolve_authorization(headers: &HeaderMap, default_token: &str) -> String {
    let customized = headers
        .get(CUSTOMIZED_TOKEN)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .unwrap_or_default();

    if !customized.is_empty() {
        return normalize_bearer(customized);
    }
    normalize_bearer(default_token)
}
