//! Shutdown coordination for the gateway.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::broadcast;

/// Coordinator for graceful shutdown.
///
/// Long-running tasks subscribe before starting; triggering broadcasts once
/// and is idempotent, safe from any task.
#[derive(Debug)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
    triggered: AtomicBool,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self {
            tx,
            triggered: AtomicBool::new(false),
        }
    }

    /// Subscribe to the shutdown signal. Must be called before the task
    /// starts waiting, or an already-sent signal is missed.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Trigger the shutdown signal. Repeated calls are no-ops.
    pub fn trigger(&self) {
        if !self.triggered.swap(true, Ordering::SeqCst) {
            let _ = self.tx.send(());
        }
    }

    /// Whether shutdown has been requested.
    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
