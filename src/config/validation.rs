//! Configuration validation.
//!
//! Serde handles the syntax; this module checks values make sense together.
//! All errors are collected rather than stopping at the first one.

use url::Url;

use crate::config::schema::ProxyConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let upstream = &config.upstream;

    check_base("upstream.api_base", &upstream.api_base, &mut errors);
    check_base("upstream.file_base", &upstream.file_base, &mut errors);

    if !upstream.stream_domain_suffix.starts_with('.') || upstream.stream_domain_suffix.len() < 2 {
        errors.push(ValidationError::new(
            "upstream.stream_domain_suffix",
            "must be a domain suffix starting with '.'",
        ));
    }
    if upstream.timeout_secs == 0 {
        errors.push(ValidationError::new("upstream.timeout_secs", "must be greater than 0"));
    }
    if upstream.stream_chunk_size == 0 {
        errors.push(ValidationError::new(
            "upstream.stream_chunk_size",
            "must be greater than 0",
        ));
    }
    if let Some(relay) = &upstream.api_relay_prefix {
        if Url::parse(relay).is_err() {
            errors.push(ValidationError::new(
                "upstream.api_relay_prefix",
                format!("not a valid URL: {relay}"),
            ));
        }
    }
    if let Some(proxy) = &upstream.proxy_url {
        if Url::parse(proxy).is_err() {
            errors.push(ValidationError::new(
                "upstream.proxy_url",
                format!("not a valid URL: {proxy}"),
            ));
        }
    }
    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<std::net::SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            "must be a socket address",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Bases are joined with the inbound path verbatim, so they must be a bare
/// http(s) origin without a trailing slash.
fn check_base(field: &'static str, value: &str, errors: &mut Vec<ValidationError>) {
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.host_str().is_some() => {
            if value.ends_with('/') {
                errors.push(ValidationError::new(field, "must not end with '/'"));
            }
        }
        _ => errors.push(ValidationError::new(
            field,
            format!("must be an absolute http(s) URL, got {value:?}"),
        )),
    }
}
