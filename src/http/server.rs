//! Gateway HTTP server and per-request pipeline.
//!
//! # Responsibilities
//! - Create the Axum router with catch-all handlers
//! - Wire up middleware (tracing, request timeout)
//! - Run the pipeline: match → authorize → local-dispatch-or-forward → log
//! - Forward unhandled requests to the matched cluster's destination
//!
//! # Pipeline states
//! ```text
//! Received → Matched|Unmatched
//!          → (if Matched) Authorized|Forbidden
//!          → (if Authorized) LocallyHandled|Forwarded|Unreachable
//!          → Logged → Responded
//! ```
//! Authorization runs strictly before any dispatch: an under-privileged
//! request never reaches a handler or a backend.

use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::uri::{Authority, PathAndQuery, Scheme},
    http::{Method, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::any,
    Json, Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use uuid::Uuid;

use crate::dispatch::{endpoint_name, HandlerError, HandlerRequest, LocalDispatchRegistry};
use crate::routing::{CompiledRoute, RouteTable, RouteTableGeneration};
use crate::security::{authorize, PrivilegeSet, PRIVILEGES_HEADER};

/// Largest body buffered for a local handler invocation.
const MAX_HANDLER_BODY: usize = 2 * 1024 * 1024;

/// Application state injected into the catch-all handler.
#[derive(Clone)]
pub struct AppState {
    /// Live routing table; one snapshot per request.
    pub table: Arc<RouteTable>,
    /// Startup-populated local handler registry.
    pub registry: Arc<LocalDispatchRegistry>,
    /// Shared client for forwarding to backends.
    pub client: Client<HttpConnector, Body>,
    /// Bound on a single forwarded call; slower backends get a 504.
    pub forward_timeout: Duration,
}

impl AppState {
    pub fn new(
        table: Arc<RouteTable>,
        registry: Arc<LocalDispatchRegistry>,
        forward_timeout: Duration,
    ) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self {
            table,
            registry,
            client,
            forward_timeout,
        }
    }
}

/// Build the Axum router with the gateway pipeline and middleware layers.
pub fn build_router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/{*path}", any(gateway_handler))
        .route("/", any(gateway_handler))
        .with_state(state)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
}

/// Catch-all handler running the full pipeline for one request.
async fn gateway_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let request_id = Uuid::new_v4();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let generation = state.table.snapshot();
    let (response, missing) = run_pipeline(&state, &generation, request, &path).await;

    log_outcome(
        request_id,
        &method,
        &path,
        response.status(),
        start,
        missing.as_deref(),
    );
    response
}

/// Returns the response plus, for forbidden outcomes, the missing-privilege
/// detail for the request log line.
async fn run_pipeline(
    state: &AppState,
    generation: &RouteTableGeneration,
    request: Request<Body>,
    path: &str,
) -> (Response, Option<String>) {
    // 1. Match against the captured generation.
    let Some(route) = generation.find(request.method(), path) else {
        let response = (StatusCode::NOT_FOUND, "Ultramarine: no route matched").into_response();
        return (response, None);
    };

    // 2. Authorize before anything can touch a handler or backend.
    let asserted = PrivilegeSet::from_header(request.headers().get(PRIVILEGES_HEADER));
    if !authorize(route.auth_required, &route.required_privileges, &asserted) {
        let missing = asserted.missing(&route.required_privileges).join(", ");
        let body = if missing.is_empty() {
            "Ultramarine Security: route accepts no privileges".to_string()
        } else {
            format!("Ultramarine Security: Missing {missing}")
        };
        return ((StatusCode::FORBIDDEN, body).into_response(), Some(missing));
    }

    // 3. Local dispatch, falling back to network forwarding.
    let handler = endpoint_name(path).and_then(|name| state.registry.resolve(name));
    if let Some(handler) = handler {
        let (mut parts, body) = request.into_parts();
        let bytes = match axum::body::to_bytes(body, MAX_HANDLER_BODY).await {
            Ok(bytes) => bytes,
            Err(_) => {
                let response =
                    (StatusCode::PAYLOAD_TOO_LARGE, "Ultramarine: request body too large")
                        .into_response();
                return (response, None);
            }
        };
        parts.headers.remove(PRIVILEGES_HEADER);

        let handler_request = HandlerRequest {
            method: parts.method.clone(),
            path: path.to_string(),
            headers: parts.headers.clone(),
            body: bytes.clone(),
        };

        match handler(handler_request).await {
            Ok(value) => return (Json(value).into_response(), None),
            Err(HandlerError::NotHandled) => {
                let request = Request::from_parts(parts, Body::from(bytes));
                return (forward(state, route, generation, request).await, None);
            }
            Err(HandlerError::Failed(detail)) => {
                tracing::error!(path = %path, error = %detail, "Local handler failed");
                let response =
                    (StatusCode::INTERNAL_SERVER_ERROR, "Ultramarine: handler error")
                        .into_response();
                return (response, None);
            }
        }
    }

    (forward(state, route, generation, request).await, None)
}

/// Forward the request to the matched cluster's destination and relay the
/// backend response verbatim. No retries; a retry is the backend's business.
async fn forward(
    state: &AppState,
    route: &CompiledRoute,
    generation: &RouteTableGeneration,
    mut request: Request<Body>,
) -> Response {
    let destination = generation
        .cluster(&route.cluster_id)
        .and_then(|c| c.primary_destination())
        .and_then(|d| Authority::from_str(d).ok());
    let Some(authority) = destination else {
        tracing::error!(
            cluster_id = %route.cluster_id,
            "No usable destination for matched cluster"
        );
        return (StatusCode::BAD_GATEWAY, "Ultramarine: no destination").into_response();
    };

    // The assertion header stays inside the gateway.
    request.headers_mut().remove(PRIVILEGES_HEADER);

    let mut uri_parts = request.uri().clone().into_parts();
    uri_parts.scheme = Some(Scheme::HTTP);
    uri_parts.authority = Some(authority);
    if uri_parts.path_and_query.is_none() {
        uri_parts.path_and_query = Some(PathAndQuery::from_static("/"));
    }
    match Uri::from_parts(uri_parts) {
        Ok(uri) => *request.uri_mut() = uri,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build upstream URI");
            return (StatusCode::BAD_GATEWAY, "Ultramarine: bad upstream URI").into_response();
        }
    }

    match tokio::time::timeout(state.forward_timeout, state.client.request(request)).await {
        Ok(Ok(response)) => {
            let (parts, body) = response.into_parts();
            Response::from_parts(parts, Body::new(body)).into_response()
        }
        Ok(Err(e)) => {
            tracing::error!(cluster_id = %route.cluster_id, error = %e, "Backend unreachable");
            (StatusCode::BAD_GATEWAY, "Ultramarine: backend unreachable").into_response()
        }
        Err(_) => {
            tracing::error!(cluster_id = %route.cluster_id, "Backend timed out");
            (StatusCode::GATEWAY_TIMEOUT, "Ultramarine: backend timed out").into_response()
        }
    }
}

/// One structured log event per request, regardless of outcome. Never on the
/// response's critical path and never able to fail the request.
fn log_outcome(
    request_id: Uuid,
    method: &Method,
    path: &str,
    status: StatusCode,
    start: Instant,
    missing: Option<&str>,
) {
    let elapsed_ms = start.elapsed().as_millis() as u64;
    if status.is_server_error() {
        tracing::error!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = status.as_u16(),
            elapsed_ms,
            "Request failed"
        );
    } else if status.is_client_error() {
        tracing::warn!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = status.as_u16(),
            elapsed_ms,
            missing = missing.unwrap_or(""),
            "Request rejected"
        );
    } else {
        tracing::info!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = status.as_u16(),
            elapsed_ms,
            "Request served"
        );
    }
}
