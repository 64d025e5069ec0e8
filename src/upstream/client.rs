//! The outbound HTTP capability.
//!
//! Handlers only see [`UpstreamClient`]; the production implementation is
//! [`ReqwestUpstream`](super::ReqwestUpstream) and tests plug in fakes.

use std::time::Duration;

use async_trait::async_trait;
use axum::http::{HeaderMap, StatusCode};
use bytes::Bytes;
use futures_util::stream::BoxStream;

/// Transport-level failure talking to the upstream.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UpstreamError {
    #[error("upstream request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("upstream request failed: {0}")]
    Transport(String),

    #[error("upstream body read failed: {0}")]
    Body(String),
}

/// One-shot, forward-only sequence of body chunks.
pub type ByteStream = BoxStream<'static, Result<Bytes, UpstreamError>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyMode {
    /// Read the whole body before returning.
    Buffered,
    /// Return as soon as the response head arrives; the body is pulled lazily.
    Streamed,
}

#[derive(Debug, Clone)]
pub struct UpstreamRequest {
    pub url: String,
    pub headers: HeaderMap,
    pub mode: BodyMode,
    /// Deadline for connecting and receiving the head (and the body when buffered).
    pub timeout: Duration,
}

pub enum UpstreamBody {
    Full(Bytes),
    Stream(ByteStream),
}

impl std::fmt::Debug for UpstreamBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpstreamBody::Full(bytes) => f.debug_tuple("Full").field(&bytes.len()).finish(),
            UpstreamBody::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

#[derive(Debug)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: UpstreamBody,
}

impl UpstreamResponse {
    pub fn content_type(&self) -> &str {
        self.headers
            .get(axum::http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }
}

/// Performs GET requests against the upstream, passing its bot-mitigation
/// checks where the implementation is able to.
#[async_trait]
pub trait UpstreamClient: Send + Sync + 'static {
    async fn get(&self, request: UpstreamRequest) -> Result<UpstreamResponse, UpstreamError>;
}
