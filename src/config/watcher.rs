//! Route document watcher for hot reload.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::loader::load_router_config;
use crate::routing::{compile, CompilerContext, RouteTable};

/// Grace period after a change notification before the document is read.
/// Editors doing "safe saves" emit several events for one logical edit and
/// may hold the file briefly; waiting and coalescing covers both.
const RELOAD_GRACE: Duration = Duration::from_millis(200);

/// Watches the route document and republishes the routing tables on change.
///
/// Single reload path: every notification funnels into one debounce loop,
/// so one logical edit produces one reload. A failed reload leaves the
/// previously published generation serving.
pub struct RouterWatcher {
    path: PathBuf,
    table: Arc<RouteTable>,
    ctx: CompilerContext,
}

/// Keeps the watcher thread and its debounce task alive.
///
/// Dropping the handle stops watching; the gateway holds it for its lifetime.
pub struct WatcherHandle {
    _watcher: RecommendedWatcher,
    _task: JoinHandle<()>,
}

impl RouterWatcher {
    pub fn new(path: &Path, table: Arc<RouteTable>, ctx: CompilerContext) -> Self {
        Self {
            path: path.to_path_buf(),
            table,
            ctx,
        }
    }

    /// Start watching. Notifications are forwarded from the notify thread to
    /// an async debounce loop that waits out the grace period, drains any
    /// queued duplicates, then reloads once.
    pub fn spawn(self) -> Result<WatcherHandle, notify::Error> {
        let (tx, mut rx) = mpsc::unbounded_channel::<()>();
        let file_name = self.path.file_name().map(|n| n.to_os_string());

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if !(event.kind.is_modify() || event.kind.is_create()) {
                        return;
                    }
                    let ours = event
                        .paths
                        .iter()
                        .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
                    if ours {
                        let _ = tx.send(());
                    }
                }
                Err(e) => tracing::error!(error = %e, "Route document watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        // Watch the containing directory: safe saves replace the file, which
        // would invalidate a watch on the file itself.
        let watch_dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        watcher.watch(watch_dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Route document watcher started");

        let task = tokio::spawn(async move {
            while rx.recv().await.is_some() {
                tokio::time::sleep(RELOAD_GRACE).await;
                // Coalesce the burst of notifications from one logical edit.
                while rx.try_recv().is_ok() {}
                self.reload();
            }
        });

        Ok(WatcherHandle {
            _watcher: watcher,
            _task: task,
        })
    }

    fn reload(&self) {
        match load_router_config(&self.path) {
            Ok(config) => {
                let tables = compile(&config, &self.ctx);
                let routes = tables.routes.len();
                let generation = self.table.publish(tables);
                tracing::info!(generation, routes, "Router configuration hot-reloaded");
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    "Failed to reload route document; keeping current generation"
                );
            }
        }
    }
}
