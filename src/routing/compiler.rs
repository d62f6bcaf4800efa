//! Route table compilation.
//!
//! # Responsibilities
//! - Turn a validated route document into compiled routes and clusters
//! - Derive deterministic route and cluster identifiers
//! - Deduplicate clusters by service name
//!
//! # Design Decisions
//! - Compilation never fails on a validated document; an empty document
//!   compiles to empty tables (the gateway then serves 404 for everything)
//! - Identifiers are pure functions of the entry, so reloads keep stable ids
//!   for unchanged routes (log correlation relies on this)
//! - Duplicate paths across services are not an error; document order decides
//!   which route wins at request time

use std::collections::HashSet;

use axum::http::Method;

use crate::config::schema::{RouteEntry, RouterConfig};
use crate::routing::table::{CompiledCluster, CompiledRoute, CompiledTables, DEFAULT_DESTINATION};

/// Inputs the compiler needs besides the document itself.
#[derive(Debug, Clone)]
pub struct CompilerContext {
    /// Authority ("host:port") every cluster's default destination points at.
    default_destination: String,
}

impl CompilerContext {
    /// Create a context from a backend address.
    ///
    /// Accepts either a bare authority ("localhost:7071") or a base URL
    /// ("http://localhost:7071/"); the scheme and trailing slash are dropped
    /// because the forwarder always speaks plain HTTP to the backend.
    pub fn new(backend_addr: &str) -> Self {
        let authority = backend_addr
            .trim_start_matches("http://")
            .trim_start_matches("https://")
            .trim_end_matches('/');
        Self {
            default_destination: authority.to_string(),
        }
    }

    pub fn default_destination(&self) -> &str {
        &self.default_destination
    }
}

/// Deterministic route id: `{service}-{slug(path)}-route`.
pub fn route_id(entry: &RouteEntry) -> String {
    format!("{}-{}-route", entry.service, slug(&entry.path))
}

/// Deterministic cluster id: `{service}-cluster`.
pub fn cluster_id(service: &str) -> String {
    format!("{service}-cluster")
}

fn slug(path: &str) -> String {
    path.replace('/', "-").trim_matches('-').to_string()
}

/// Compile a route document into routing tables.
pub fn compile(config: &RouterConfig, ctx: &CompilerContext) -> CompiledTables {
    let mut tables = CompiledTables::default();

    for entry in &config.routes {
        let cluster_id = cluster_id(&entry.service);

        tables.routes.push(CompiledRoute {
            route_id: route_id(entry),
            cluster_id: cluster_id.clone(),
            path_prefix: entry.path.clone(),
            methods: compile_methods(&entry.methods),
            auth_required: entry.auth.required,
            required_privileges: entry.auth.privileges.clone(),
        });

        // One cluster per service, shared by every route naming it.
        tables
            .clusters
            .entry(cluster_id.clone())
            .or_insert_with(|| CompiledCluster {
                cluster_id,
                destinations: [(
                    DEFAULT_DESTINATION.to_string(),
                    ctx.default_destination.clone(),
                )]
                .into_iter()
                .collect(),
            });
    }

    tables
}

fn compile_methods(methods: &[String]) -> Option<HashSet<Method>> {
    if methods.is_empty() {
        return None;
    }
    Some(
        methods
            .iter()
            .filter_map(|m| Method::from_bytes(m.to_ascii_uppercase().as_bytes()).ok())
            .collect(),
    )
}
