//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (host, port).
    pub listener: ListenerConfig,

    /// Basic-Auth access gate.
    pub auth: AuthConfig,

    /// Upstream hosts and outbound call settings.
    pub upstream: UpstreamConfig,

    /// Server-held upstream credential.
    pub credentials: CredentialsConfig,

    /// Landing page settings.
    pub site: SiteConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind (e.g., "0.0.0.0").
    pub host: String,

    /// Listen port.
    pub port: u16,
}

impl ListenerConfig {
    /// Socket address string suitable for `TcpListener::bind`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

/// Basic-Auth credentials. The gate is active when either field is non-empty.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AuthConfig {
    pub basic_user: String,
    pub basic_pass: String,
}

impl AuthConfig {
    pub fn is_enabled(&self) -> bool {
        !self.basic_user.is_empty() || !self.basic_pass.is_empty()
    }
}

/// Upstream configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Scheme and host of the API upstream (no trailing slash).
    pub api_base: String,

    /// Scheme and host of the file-delivery upstream.
    pub file_base: String,

    /// Hostname suffix the `/view` route is allowed to reach.
    pub stream_domain_suffix: String,

    /// Per-attempt timeout in seconds.
    pub timeout_secs: u64,

    /// Upper bound on the size of each relayed stream chunk.
    pub stream_chunk_size: usize,

    /// Optional URL-fetching relay placed in front of the API host,
    /// e.g. "https://api.allorigins.win/raw?url=".
    pub api_relay_prefix: Option<String>,

    /// Optional outbound proxy for all upstream calls.
    pub proxy_url: Option<String>,

    /// User-Agent sent when the caller supplied none.
    pub default_user_agent: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.iwara.tv".to_string(),
            file_base: "https://files.iwara.tv".to_string(),
            stream_domain_suffix: ".iwara.tv".to_string(),
            timeout_secs: 15,
            stream_chunk_size: 8 * 1024,
            api_relay_prefix: None,
            proxy_url: None,
            default_user_agent:
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string(),
        }
    }
}

/// Server-held credential settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CredentialsConfig {
    /// Default upstream token, raw or already `Bearer`-prefixed.
    pub default_token: String,

    /// `Retry-After` seconds advertised by `/token-status` when no token is set.
    pub retry_after_secs: u64,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            default_token: String::new(),
            retry_after_secs: 86_400,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SiteConfig {
    /// HTML served at `/`, read once at startup.
    pub index_path: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            index_path: "./index.html".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
