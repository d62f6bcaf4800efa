//! Ultramarine Gateway
//!
//! A local/edge API gateway built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────┐
//!                      │              ULTRAMARINE GATEWAY             │
//!                      │                                              │
//!   Client Request     │  ┌─────────┐   ┌───────────┐   ┌──────────┐ │
//!   ───────────────────┼─▶│  http   │──▶│  routing  │──▶│ security │ │
//!                      │  │ server  │   │  tables   │   │  privs   │ │
//!                      │  └─────────┘   └─────┬─────┘   └────┬─────┘ │
//!                      │                      │              │       │
//!                      │                      ▼              ▼       │
//!                      │               ┌────────────┐  ┌───────────┐ │
//!                      │               │  dispatch  │  │  forward  │─┼──▶ Backend
//!                      │               │  registry  │  │  (hyper)  │ │
//!                      │               └────────────┘  └───────────┘ │
//!                      │                                              │
//!                      │  ┌────────────────────────────────────────┐ │
//!                      │  │  config (YAML doc, notify hot reload)  │ │
//!                      │  │  lifecycle (graceful shutdown)         │ │
//!                      │  └────────────────────────────────────────┘ │
//!                      └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ultramarine_gateway::{Gateway, GatewayOptions, LocalDispatchRegistry};

#[derive(Parser, Debug)]
#[command(name = "ultramarine-gateway", about = "Local/edge API gateway")]
struct Args {
    /// Port to listen on.
    #[arg(long, default_value_t = 8080)]
    port: u16,

    /// Path to the route document.
    #[arg(long, default_value = "config/router.yaml")]
    routes: PathBuf,

    /// Backend address requests are forwarded to.
    #[arg(long, default_value = "localhost:7071")]
    backend: String,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = 30)]
    request_timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ultramarine_gateway=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        port = args.port,
        routes = ?args.routes,
        backend = %args.backend,
        "ultramarine-gateway v0.1.0 starting"
    );

    let handle = Gateway::start(GatewayOptions {
        port: args.port,
        routes_path: args.routes,
        backend_addr: args.backend,
        registry: LocalDispatchRegistry::new(),
        request_timeout: Duration::from_secs(args.request_timeout_secs),
        ..Default::default()
    })
    .await?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");
    handle.stop().await;

    Ok(())
}
