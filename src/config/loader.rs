//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;

use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {value:?}")]
    Env { key: &'static str, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration: defaults, then the optional TOML file, then
/// environment overrides. The result is validated before it is returned.
pub fn load_config(path: Option<&Path>) -> Result<ProxyConfig, ConfigError> {
    let config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => ProxyConfig::default(),
    };

    let config = apply_env(config, |key| std::env::var(key).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply environment overrides through `lookup`, so tests never touch the
/// real process environment.
pub fn apply_env<F>(mut config: ProxyConfig, lookup: F) -> Result<ProxyConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(port) = lookup("PORT") {
        config.listener.port = port.trim().parse().map_err(|_| ConfigError::Env {
            key: "PORT",
            value: port.clone(),
        })?;
    }
    if let Some(user) = lookup("BASIC_AUTH_USER") {
        config.auth.basic_user = user;
    }
    if let Some(pass) = lookup("BASIC_AUTH_PASS") {
        config.auth.basic_pass = pass;
    }
    if let Some(token) = lookup("IWARA_AUTHORIZATION") {
        config.credentials.default_token = token;
    }
    if let Some(base) = lookup("UPSTREAM_API_BASE") {
        config.upstream.api_base = base;
    }
    if let Some(base) = lookup("UPSTREAM_FILE_BASE") {
        config.upstream.file_base = base;
    }
    if let Some(relay) = lookup("UPSTREAM_API_RELAY") {
        config.upstream.api_relay_prefix = non_empty(relay);
    }
    if let Some(proxy) = lookup("UPSTREAM_PROXY") {
        config.upstream.proxy_url = non_empty(proxy);
    }

    Ok(config)
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
