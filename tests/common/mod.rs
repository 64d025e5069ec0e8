//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, Request, StatusCode};
use axum::Router;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use bytes::Bytes;
use futures_util::{stream, StreamExt};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use iwara_proxy::upstream::{
    UpstreamBody, UpstreamClient, UpstreamError, UpstreamRequest, UpstreamResponse,
};
use iwara_proxy::{HttpServer, ProxyConfig};

type Responder =
    Box<dyn Fn(&UpstreamRequest) -> Result<UpstreamResponse, UpstreamError> + Send + Sync>;

/// Upstream stand-in that records every request it receives.
pub struct FakeUpstream {
    requests: Mutex<Vec<UpstreamRequest>>,
    responder: Responder,
}

impl FakeUpstream {
    pub fn new<F>(responder: F) -> Arc<Self>
    where
        F: Fn(&UpstreamRequest) -> Result<UpstreamResponse, UpstreamError> + Send + Sync + 'static,
    {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            responder: Box::new(responder),
        })
    }

    /// Always answers with a buffered body of the given content type.
    pub fn with_body(status: u16, content_type: &'static str, body: &'static str) -> Arc<Self> {
        Self::new(move |_| Ok(buffered(status, content_type, body)))
    }

    pub fn failing(message: &'static str) -> Arc<Self> {
        Self::new(move |_| Err(UpstreamError::Transport(message.to_string())))
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> UpstreamRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("upstream was never called")
    }
}

#[async_trait]
impl UpstreamClient for FakeUpstream {
    async fn get(&self, request: UpstreamRequest) -> Result<UpstreamResponse, UpstreamError> {
        let result = (self.responder)(&request);
        self.requests.lock().unwrap().push(request);
        result
    }
}

pub fn buffered(status: u16, content_type: &str, body: &'static str) -> UpstreamResponse {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_str(content_type).unwrap());
    UpstreamResponse {
        status: StatusCode::from_u16(status).unwrap(),
        headers,
        body: UpstreamBody::Full(Bytes::from_static(body.as_bytes())),
    }
}

pub fn streamed(status: u16, headers: HeaderMap, chunks: Vec<&'static [u8]>) -> UpstreamResponse {
    let chunks = chunks
        .into_iter()
        .map(|c| Ok::<_, UpstreamError>(Bytes::from_static(c)));
    UpstreamResponse {
        status: StatusCode::from_u16(status).unwrap(),
        headers,
        body: UpstreamBody::Stream(stream::iter(chunks).boxed()),
    }
}

/// Config that never reads a real landing page.
pub fn test_config() -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.site.index_path = "/nonexistent/index.html".to_string();
    config
}

pub fn app(config: ProxyConfig, upstream: Arc<FakeUpstream>) -> Router {
    HttpServer::with_client(config, upstream).router()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn body_bytes(body: Body) -> Bytes {
    axum::body::to_bytes(body, usize::MAX).await.unwrap()
}

pub async fn body_json(body: Body) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(body).await).unwrap()
}

/// Compact JWT-shaped token carrying the given `exp`.
pub fn token_with_exp(exp: u64) -> String {
    format!(
        "{}.{}.sig",
        URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#),
        URL_SAFE_NO_PAD.encode(format!(r#"{{"id":"user","exp":{exp}}}"#))
    )
}

/// Start a raw-TCP backend answering every connection with the given
/// status, content type and body. Each request head is sent on the
/// returned channel.
pub async fn start_programmable_backend(
    status_line: &'static str,
    content_type: &'static str,
    body: &'static str,
) -> (SocketAddr, mpsc::UnboundedReceiver<String>) {
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status_line,
        content_type,
        body.len(),
        body
    );
    start_raw_backend(response.into_bytes(), Duration::ZERO).await
}

/// Start a raw-TCP backend that writes `response` verbatim to every
/// connection, then keeps the socket open for `hold_open` before closing.
/// Each request head is sent on the returned channel.
pub async fn start_raw_backend(
    response: Vec<u8>,
    hold_open: Duration,
) -> (SocketAddr, mpsc::UnboundedReceiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();
    let response = Arc::new(response);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let tx = tx.clone();
            let response = response.clone();
            tokio::spawn(async move {
                let mut head = Vec::new();
                let mut buf = [0u8; 1024];
                while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => head.extend_from_slice(&buf[..n]),
                    }
                }
                let _ = tx.send(String::from_utf8_lossy(&head).into_owned());

                let _ = socket.write_all(&response).await;
                tokio::time::sleep(hold_open).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (addr, rx)
}
