//! `reqwest`-backed upstream client.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::{StreamExt, TryStreamExt};

use crate::config::UpstreamConfig;
use crate::resilience::timeouts::with_timeout;

use super::client::{
    BodyMode, UpstreamBody, UpstreamClient, UpstreamError, UpstreamRequest, UpstreamResponse,
};

/// Shared connection pool for all upstream calls.
#[derive(Debug, Clone)]
pub struct ReqwestUpstream {
    client: reqwest::Client,
}

impl ReqwestUpstream {
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        // read_timeout is per read, so a streamed body only fails once it stalls.
        let mut builder = reqwest::Client::builder()
            .connect_timeout(timeout)
            .read_timeout(timeout);

        if let Some(proxy) = &config.proxy_url {
            let proxy = reqwest::Proxy::all(proxy.as_str())
                .map_err(|e| UpstreamError::Transport(e.to_string()))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl UpstreamClient for ReqwestUpstream {
    async fn get(&self, request: UpstreamRequest) -> Result<UpstreamResponse, UpstreamError> {
        let UpstreamRequest {
            url,
            headers,
            mode,
            timeout,
        } = request;
        let send = self.client.get(url).headers(headers).send();

        match mode {
            BodyMode::Buffered => {
                with_timeout(timeout, async move {
                    let response = send.await.map_err(transport)?;
                    let status = response.status();
                    let headers = response.headers().clone();
                    let bytes = response
                        .bytes()
                        .await
                        .map_err(|e| UpstreamError::Body(e.to_string()))?;
                    Ok(UpstreamResponse {
                        status,
                        headers,
                        body: UpstreamBody::Full(bytes),
                    })
                })
                .await
            }
            BodyMode::Streamed => {
                let response = with_timeout(timeout, async move { send.await.map_err(transport) }).await?;
                let status = response.status();
                let headers = response.headers().clone();
                let stream = response
                    .bytes_stream()
                    .map_err(|e| UpstreamError::Body(e.to_string()))
                    .boxed();
                Ok(UpstreamResponse {
                    status,
                    headers,
                    body: UpstreamBody::Stream(stream),
                })
            }
        }
    }
}

fn transport(err: reqwest::Error) -> UpstreamError {
    UpstreamError::Transport(err.to_string())
}
