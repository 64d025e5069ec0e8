//! Freshness check for the server-held credential.
//!
//! The token is treated as a compact JWT and only its `exp` claim is read.
//! The signature is never verified; anything that cannot be decoded counts
//! as expired.

use std::time::{SystemTime, UNIX_EPOCH};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;
use serde_json::Value;

use super::resolver::{normalize_bearer, strip_bearer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenStatus {
    NotConfigured,
    Valid,
    Expired,
}

impl TokenStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenStatus::NotConfigured => "not_configured",
            TokenStatus::Valid => "valid",
            TokenStatus::Expired => "expired",
        }
    }
}

/// Classify `default_token` against the current wall clock.
pub fn token_status(default_token: &str) -> TokenStatus {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default();
    token_status_at(default_token, now)
}

/// Classify `default_token` against `now` (seconds since the epoch).
pub fn token_status_at(default_token: &str, now: f64) -> TokenStatus {
    let token = normalize_bearer(default_token);
    if token.is_empty() {
        return TokenStatus::NotConfigured;
    }

    match decode_claims(&token).and_then(|claims| claims.get("exp").and_then(Value::as_f64)) {
        Some(exp) if exp > now => TokenStatus::Valid,
        _ => TokenStatus::Expired,
    }
}

/// Decode the payload segment of a `Bearer <header>.<payload>.<signature>` token.
pub fn decode_claims(token: &str) -> Option<Value> {
    let raw = strip_bearer(token.trim()).unwrap_or(token.trim());
    let segments: Vec<&str> = raw.split('.').collect();
    if segments.len() != 3 {
        return None;
    }

    let mut payload: String = segments[1]
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();
    while payload.len() % 4 != 0 {
        payload.push('=');
    }

    let bytes = STANDARD.decode(payload).ok()?;
    serde_json::from_slice(&bytes).ok()
}
