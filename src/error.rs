//! Request-level error taxonomy.
//!
//! Every failure a handler can hit is a [`ProxyError`]. It renders as a JSON
//! body `{"error": <message>}` with the mapped status, so nothing reaches the
//! client as an unformatted fault.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::upstream::UpstreamError;

/// Challenge sent with every 401.
pub const BASIC_CHALLENGE: &str = r#"Basic realm="IwaraProxy", charset="UTF-8""#;

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("route not found")]
    NotFound,

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("upstream declared JSON but sent an invalid body: {0}")]
    UpstreamJsonDecode(#[from] serde_json::Error),

    #[error("{0}")]
    Internal(String),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ProxyError::Forbidden(_) => StatusCode::FORBIDDEN,
            ProxyError::Unauthorized => StatusCode::UNAUTHORIZED,
            ProxyError::NotFound => StatusCode::NOT_FOUND,
            ProxyError::Upstream(_)
            | ProxyError::UpstreamJsonDecode(_)
            | ProxyError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProxyError::BadRequest(_) => "bad_request",
            ProxyError::Forbidden(_) => "forbidden",
            ProxyError::Unauthorized => "unauthorized",
            ProxyError::NotFound => "not_found",
            ProxyError::Upstream(UpstreamError::Timeout(_)) => "upstream_timeout",
            ProxyError::Upstream(_) => "upstream_transport",
            ProxyError::UpstreamJsonDecode(_) => "upstream_json",
            ProxyError::Internal(_) => "internal",
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut response = (status, Json(json!({ "error": self.to_string() }))).into_response();
        if matches!(self, ProxyError::Unauthorized) {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static(BASIC_CHALLENGE),
            );
        }
        response
    }
}

pub type ProxyResult<T> = Result<T, ProxyError>;
