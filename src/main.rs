//! Iwara Reverse Proxy
//!
//! Forwards browser requests to the Iwara API and file hosts with a
//! server-held credential, and streams media with range support.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────────┐
//!                        │                  IWARA PROXY                      │
//!   Client Request       │  ┌──────────┐   ┌──────────┐   ┌─────────────┐   │
//!   ─────────────────────┼─▶│request id│──▶│basic auth│──▶│   routing   │   │
//!                        │  │ + trace  │   │   gate   │   │api|file|view│   │
//!                        │  └──────────┘   └──────────┘   └──────┬──────┘   │
//!                        │                                       ▼          │
//!                        │                  ┌────────────────────────────┐  │
//!                        │                  │ header filter + credential │  │
//!                        │                  └─────────────┬──────────────┘  │
//!                        │                                ▼                 │
//!   Client Response      │  ┌──────────────┐      ┌──────────────┐          │
//!   ◀────────────────────┼──│    relay     │◀─────│   upstream   │◀─────────┼── api.iwara.tv
//!                        │  │json|raw|chunk│      │    client    │          │   files.iwara.tv
//!                        │  └──────────────┘      └──────────────┘          │   *.iwara.tv
//!                        └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use iwara_proxy::config::load_config;
use iwara_proxy::lifecycle::startup;
use iwara_proxy::observability::logging;

#[derive(Parser)]
#[command(name = "iwara-proxy")]
#[command(about = "Reverse proxy for the Iwara API and file hosts", long_about = None)]
struct Cli {
    /// Optional TOML config file; environment variables override it.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let cli = Cli::parse();
    tracing::info!("iwara-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    let config = load_config(cli.config.as_deref())?;
    startup::start(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
