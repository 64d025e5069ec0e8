//! Startup orchestration.
//!
//! # Responsibilities
//! - Start the optional metrics endpoint
//! - Build the upstream client and HTTP server
//! - Bind the listener and serve until a shutdown signal
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listener binds last, so traffic only arrives once everything is ready

use tokio::net::TcpListener;

use crate::config::ProxyConfig;
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;

pub async fn start(config: ProxyConfig) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        port = config.listener.port,
        api_base = %config.upstream.api_base,
        file_base = %config.upstream.file_base,
        relay = ?config.upstream.api_relay_prefix,
        timeout_secs = config.upstream.timeout_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let bind_address = config.listener.bind_address();
    let server = HttpServer::new(config)?;

    let listener = TcpListener::bind(&bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();
    server.run(listener, shutdown.subscribe()).await?;

    Ok(())
}
