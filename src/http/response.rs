//! Response relay.
//!
//! # Responsibilities
//! - Re-emit JSON upstream bodies as JSON with the same status
//! - Copy other buffered bodies byte-for-byte with their content type
//! - Stream media bodies in bounded chunks with upstream headers
//!
//! # Design Decisions
//! - A body declared as JSON that fails to parse is a hard error (500)
//! - Streaming responses avoid buffering the entire body
//! - Transport framing headers are stripped, range headers pass untouched

use axum::{
    body::Body,
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use futures_util::{StreamExt, TryStreamExt};

use crate::error::ProxyResult;
use crate::security::headers::strip_transport_headers;
use crate::upstream::{BoundedChunks, UpstreamBody, UpstreamError, UpstreamResponse};

/// Shape a buffered upstream response for the client.
pub async fn relay_buffered(upstream: UpstreamResponse) -> ProxyResult<Response> {
    let status = upstream.status;
    let content_type = upstream.content_type().to_string();
    let body = match upstream.body {
        UpstreamBody::Full(bytes) => bytes,
        UpstreamBody::Stream(stream) => stream
            .try_fold(Vec::new(), |mut acc, chunk| async move {
                acc.extend_from_slice(&chunk);
                Ok(acc)
            })
            .await?
            .into(),
    };

    if content_type.contains("application/json") {
        let value: serde_json::Value = serde_json::from_slice(&body)?;
        return Ok((status, Json(value)).into_response());
    }

    let mut response = (status, body).into_response();
    match HeaderValue::from_str(&content_type) {
        Ok(value) if !content_type.is_empty() => {
            response.headers_mut().insert(header::CONTENT_TYPE, value);
        }
        _ => {
            response.headers_mut().remove(header::CONTENT_TYPE);
        }
    }
    Ok(response)
}

/// Relay an upstream response as a lazily pulled body of chunks no larger
/// than `chunk_size`.
pub fn relay_stream(upstream: UpstreamResponse, chunk_size: usize) -> Response {
    let headers = strip_transport_headers(&upstream.headers);
    let stream = match upstream.body {
        UpstreamBody::Stream(stream) => stream,
        UpstreamBody::Full(bytes) => {
            futures_util::stream::once(async move { Ok::<_, UpstreamError>(bytes) }).boxed()
        }
    };

    let body = BoundedChunks::new(stream, chunk_size).inspect_err(|e| {
        tracing::error!(error = %e, "Upstream stream aborted mid-transfer");
    });

    let mut response = Response::new(Body::from_stream(body));
    *response.status_mut() = upstream.status;
    *response.headers_mut() = headers;
    response
}
