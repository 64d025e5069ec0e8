//! Upstream target construction.
//!
//! # Responsibilities
//! - Map each forwarding route to its upstream origin
//! - Join the inbound path and query onto that origin verbatim
//! - Vet caller-supplied stream URLs before any outbound call
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - No re-encoding or path normalization of the inbound request
//! - Only the stream route takes its host from the caller

use url::{form_urlencoded, Url};

use crate::config::UpstreamConfig;
use crate::error::ProxyError;
use crate::routing::matcher::{AndMatcher, HostSuffixMatcher, Matcher, SchemeMatcher};

/// Forwarding behavior selected for an inbound path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    Api,
    File,
    Stream,
}

/// Routes whose upstream origin is fixed by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixedRoute {
    Api,
    File,
}

impl From<FixedRoute> for RouteKind {
    fn from(route: FixedRoute) -> Self {
        match route {
            FixedRoute::Api => RouteKind::Api,
            FixedRoute::File => RouteKind::File,
        }
    }
}

impl RouteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteKind::Api => "api",
            RouteKind::File => "file",
            RouteKind::Stream => "stream",
        }
    }
}

/// Compiled upstream targets.
#[derive(Debug)]
pub struct Router {
    api_base: String,
    file_base: String,
    api_relay_prefix: Option<String>,
    stream_policy: AndMatcher,
}

impl Router {
    pub fn from_config(config: &UpstreamConfig) -> Self {
        Self {
            api_base: config.api_base.clone(),
            file_base: config.file_base.clone(),
            api_relay_prefix: config.api_relay_prefix.clone(),
            stream_policy: AndMatcher::new(vec![
                Box::new(SchemeMatcher::http()),
                Box::new(HostSuffixMatcher::new(&config.stream_domain_suffix)),
            ]),
        }
    }

    /// Upstream URL for a fixed-host route. `path_and_query` is used as received.
    pub fn target(&self, route: FixedRoute, path_and_query: &str) -> String {
        match route {
            FixedRoute::Api => {
                let direct = format!("{}{}", self.api_base, path_and_query);
                match &self.api_relay_prefix {
                    Some(prefix) => {
                        let encoded: String =
                            form_urlencoded::byte_serialize(direct.as_bytes()).collect();
                        format!("{prefix}{encoded}")
                    }
                    None => direct,
                }
            }
            FixedRoute::File => format!("{}{}", self.file_base, path_and_query),
        }
    }

    /// Validate the `url` parameter of the stream route.
    pub fn stream_target(&self, url: Option<&str>) -> Result<Url, ProxyError> {
        let raw = url
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| ProxyError::BadRequest("missing url parameter".to_string()))?;

        let forbidden = || ProxyError::Forbidden("target host is not allowed".to_string());
        let parsed = Url::parse(raw).map_err(|_| forbidden())?;
        if self.stream_policy.matches(&parsed) {
            Ok(parsed)
        } else {
            Err(forbidden())
        }
    }
}
