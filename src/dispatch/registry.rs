//! Local handler registration and lookup.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use axum::body::Bytes;
use axum::http::{HeaderMap, Method};
use futures_util::future::BoxFuture;
use thiserror::Error;

/// Normalized request handed to a local handler.
///
/// The privilege assertion header is removed before the handler sees it,
/// same as for forwarded requests.
#[derive(Debug, Clone)]
pub struct HandlerRequest {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Errors a local handler can produce.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The handler declined the request; the gateway falls back to
    /// forwarding it to the matched cluster.
    #[error("not handled")]
    NotHandled,

    /// The handler failed; surfaced to the caller as a 500.
    #[error("handler failed: {0}")]
    Failed(String),
}

/// Result value a local handler returns; serialized as the JSON response body.
pub type HandlerResult = Result<serde_json::Value, HandlerError>;

/// Boxed handler capability stored in the registry.
pub type HandlerFn = Arc<dyn Fn(HandlerRequest) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

/// Mapping from logical endpoint name to an in-process handler.
///
/// Built at startup, immutable afterwards. Lookup keys are derived from the
/// final path segment of a request: lowercased, with `-` removed, matching
/// how the original endpoint classes were named.
#[derive(Default)]
pub struct LocalDispatchRegistry {
    handlers: HashMap<String, HandlerFn>,
}

impl LocalDispatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under a logical endpoint name (case-insensitive).
    /// A later registration under the same name replaces the earlier one.
    pub fn register<F, Fut>(&mut self, name: &str, handler: F)
    where
        F: Fn(HandlerRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        let handler: HandlerFn = Arc::new(move |req| Box::pin(handler(req)));
        self.handlers.insert(normalize(name), handler);
    }

    /// Resolve a handler for a path's final segment.
    pub fn resolve(&self, segment: &str) -> Option<HandlerFn> {
        self.handlers.get(&normalize(segment)).cloned()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for LocalDispatchRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalDispatchRegistry")
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

/// The logical endpoint name of a request path: its final non-empty segment.
pub fn endpoint_name(path: &str) -> Option<&str> {
    path.rsplit('/').find(|s| !s.is_empty())
}
