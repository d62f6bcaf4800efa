//! Gateway startup and the process control surface.
//!
//! The orchestration layer drives the gateway through exactly two hooks:
//! [`Gateway::start`] and [`GatewayHandle::stop`].

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::config::loader::load_router_config;
use crate::config::watcher::{RouterWatcher, WatcherHandle};
use crate::dispatch::LocalDispatchRegistry;
use crate::http::{build_router, AppState};
use crate::lifecycle::Shutdown;
use crate::routing::{compile, CompilerContext, RouteTable};

/// Errors fatal to gateway startup.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The listening port could not be bound.
    #[error("failed to bind listener: {0}")]
    Bind(std::io::Error),

    /// The route document watcher could not be installed.
    #[error("failed to watch route document: {0}")]
    Watch(#[from] notify::Error),
}

/// Startup parameters for a gateway instance.
#[derive(Debug)]
pub struct GatewayOptions {
    /// Port to listen on; 0 picks an ephemeral port.
    pub port: u16,
    /// Location of the route document. A missing or invalid document at
    /// startup is not fatal; the gateway starts with an empty table and the
    /// watcher picks up the first good version.
    pub routes_path: PathBuf,
    /// Address of the downstream service clusters forward to.
    pub backend_addr: String,
    /// Local handlers, registered before start; immutable afterwards.
    pub registry: LocalDispatchRegistry,
    /// Overall per-request timeout.
    pub request_timeout: Duration,
    /// Bound on one forwarded backend call.
    pub forward_timeout: Duration,
}

impl Default for GatewayOptions {
    fn default() -> Self {
        Self {
            port: 8080,
            routes_path: PathBuf::from("config/router.yaml"),
            backend_addr: "localhost:7071".to_string(),
            registry: LocalDispatchRegistry::new(),
            request_timeout: Duration::from_secs(30),
            forward_timeout: Duration::from_secs(10),
        }
    }
}

/// Namespace for gateway startup.
pub struct Gateway;

impl Gateway {
    /// Start a gateway instance: load and compile the route document, bind
    /// the listener, install the hot-reload watcher, and begin serving.
    ///
    /// Returns once the listener is bound and serving has been spawned.
    pub async fn start(options: GatewayOptions) -> Result<GatewayHandle, GatewayError> {
        let ctx = CompilerContext::new(&options.backend_addr);
        let table = Arc::new(RouteTable::empty());

        match load_router_config(&options.routes_path) {
            Ok(config) => {
                let tables = compile(&config, &ctx);
                let routes = tables.routes.len();
                let generation = table.publish(tables);
                tracing::info!(generation, routes, "Route document loaded");
            }
            Err(e) => {
                tracing::warn!(
                    path = ?options.routes_path,
                    error = %e,
                    "Route document unavailable at startup; serving empty table"
                );
            }
        }

        let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, options.port))
            .await
            .map_err(GatewayError::Bind)?;
        let local_addr = listener.local_addr().map_err(GatewayError::Bind)?;

        let watcher = RouterWatcher::new(&options.routes_path, table.clone(), ctx).spawn()?;

        let state = AppState::new(
            table,
            Arc::new(options.registry),
            options.forward_timeout,
        );
        let app = build_router(state, options.request_timeout);

        let shutdown = Shutdown::new();
        let mut shutdown_rx = shutdown.subscribe();
        let server = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.recv().await;
                })
                .await
        });

        tracing::info!(address = %local_addr, "Ultramarine gateway listening");

        Ok(GatewayHandle {
            local_addr,
            shutdown,
            server: Mutex::new(Some(server)),
            _watcher: watcher,
        })
    }
}

/// A running gateway instance.
pub struct GatewayHandle {
    local_addr: SocketAddr,
    shutdown: Shutdown,
    server: Mutex<Option<JoinHandle<std::io::Result<()>>>>,
    _watcher: WatcherHandle,
}

impl GatewayHandle {
    /// Address the gateway is listening on.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop the gateway: stop accepting, drain in-flight requests, release
    /// the listener. Idempotent and safe to call from any task.
    pub async fn stop(&self) {
        self.shutdown.trigger();
        let server = self.server.lock().await.take();
        if let Some(server) = server {
            match server.await {
                Ok(Ok(())) => tracing::info!("Gateway stopped"),
                Ok(Err(e)) => tracing::error!(error = %e, "Gateway server error on shutdown"),
                Err(e) => tracing::error!(error = %e, "Gateway server task panicked"),
            }
        }
    }
}
