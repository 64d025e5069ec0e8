//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, CORS, access gate)
//! - Bind server to listener
//! - Drain in-flight requests on shutdown

use std::sync::Arc;

use axum::{middleware, routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::ProxyConfig;
use crate::http::handlers::{
    api_proxy, backend_token_status, file_proxy, landing_page, not_found, view_stream,
};
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::routing::Router as ProxyRouter;
use crate::security::basic_auth::basic_auth_middleware;
use crate::upstream::{ReqwestUpstream, UpstreamClient, UpstreamError};

/// Served at `/` when the configured page cannot be read.
const FALLBACK_INDEX: &str = "<h1>Loading...</h1>";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ProxyConfig>,
    pub router: Arc<ProxyRouter>,
    pub client: Arc<dyn UpstreamClient>,
    pub index_html: Arc<str>,
}

/// HTTP server for the proxy.
pub struct HttpServer {
    router: Router,
    config: Arc<ProxyConfig>,
}

impl HttpServer {
    /// Create a server that talks to the real upstream.
    pub fn new(config: ProxyConfig) -> Result<Self, UpstreamError> {
        let client = ReqwestUpstream::new(&config.upstream)?;
        Ok(Self::with_client(config, Arc::new(client)))
    }

    /// Create a server with a caller-provided upstream client.
    pub fn with_client(config: ProxyConfig, client: Arc<dyn UpstreamClient>) -> Self {
        let config = Arc::new(config);
        let index_html = load_index(&config.site.index_path);

        let state = AppState {
            router: Arc::new(ProxyRouter::from_config(&config.upstream)),
            config: config.clone(),
            client,
            index_html,
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        let auth = Arc::new(config.auth.clone());

        Router::new()
            .route("/", get(landing_page))
            .route("/token-status", get(backend_token_status))
            .route("/videos", get(api_proxy))
            .route("/video/{*subpath}", get(api_proxy))
            .route("/file/{*subpath}", get(file_proxy))
            .route("/view", get(view_stream))
            .fallback(not_found)
            .with_state(state)
            .layer(middleware::from_fn_with_state(auth, basic_auth_middleware))
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
            .layer(propagate_request_id_layer())
            .layer(set_request_id_layer())
    }

    /// The fully layered router, for driving requests without a listener.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            gate = self.config.auth.is_enabled(),
            default_token = !self.config.credentials.default_token.trim().is_empty(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

fn load_index(path: &str) -> Arc<str> {
    match std::fs::read_to_string(path) {
        Ok(html) => html.into(),
        Err(e) => {
            tracing::warn!(path = %path, error = %e, "Landing page unreadable, serving placeholder");
            FALLBACK_INDEX.into()
        }
    }
}
