//! Compiled route tables and generation publishing.
//!
//! # Responsibilities
//! - Hold the immutable artifacts of a compile (routes + clusters)
//! - Look up the first matching route for a request
//! - Publish new generations atomically; readers never block
//!
//! # Design Decisions
//! - A generation is immutable after construction (thread-safe without locks)
//! - The live generation is swapped whole via `ArcSwap`; the watcher is the
//!   only writer, every request takes one snapshot and dispatches against it
//! - O(n) path prefix scan in document order (first match wins)
//! - Explicit no-match rather than silent default

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;
use axum::http::Method;

/// Name of the default destination inside a cluster.
pub const DEFAULT_DESTINATION: &str = "local";

/// A single compiled route: path prefix match plus authorization metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledRoute {
    /// Deterministic identifier, stable across reloads of an unchanged entry.
    pub route_id: String,
    /// Identifier of the cluster this route forwards to.
    pub cluster_id: String,
    /// Path prefix; any remaining segments match implicitly.
    pub path_prefix: String,
    /// Allowed methods. `None` means all methods.
    pub methods: Option<HashSet<Method>>,
    /// Whether the caller must assert privileges.
    pub auth_required: bool,
    /// Privileges the caller must assert, in document order.
    pub required_privileges: Vec<String>,
}

impl CompiledRoute {
    /// Returns true if the request method and path satisfy this route.
    pub fn matches(&self, method: &Method, path: &str) -> bool {
        if !self.prefix_matches(path) {
            return false;
        }
        match &self.methods {
            Some(allowed) => allowed.contains(method),
            None => true,
        }
    }

    /// Prefix match on whole path segments: "/api" covers "/api" and
    /// "/api/v1" but not "/apiary".
    fn prefix_matches(&self, path: &str) -> bool {
        let prefix = self.path_prefix.as_str();
        if !path.starts_with(prefix) {
            return false;
        }
        path.len() == prefix.len()
            || prefix.ends_with('/')
            || path.as_bytes()[prefix.len()] == b'/'
    }
}

/// The deduplicated set of destinations behind a logical service name.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledCluster {
    pub cluster_id: String,
    /// Destination name -> authority ("host:port").
    pub destinations: HashMap<String, String>,
}

impl CompiledCluster {
    /// The destination requests are forwarded to.
    ///
    /// Prefers the default destination; falls back to any other so a cluster
    /// with renamed destinations still forwards. Load balancing across
    /// multiple destinations is an extension point, not current behavior.
    pub fn primary_destination(&self) -> Option<&str> {
        self.destinations
            .get(DEFAULT_DESTINATION)
            .or_else(|| self.destinations.values().next())
            .map(String::as_str)
    }
}

/// Routes and clusters produced by one compile, before a generation id is
/// stamped on them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledTables {
    pub routes: Vec<CompiledRoute>,
    pub clusters: HashMap<String, CompiledCluster>,
}

/// One immutable, atomically published snapshot of the routing tables.
#[derive(Debug)]
pub struct RouteTableGeneration {
    pub routes: Vec<CompiledRoute>,
    pub clusters: HashMap<String, CompiledCluster>,
    /// Monotonic id assigned at publish time.
    pub generation: u64,
}

impl RouteTableGeneration {
    /// A generation with no routes: every request misses (404).
    pub fn empty() -> Self {
        Self {
            routes: Vec::new(),
            clusters: HashMap::new(),
            generation: 0,
        }
    }

    /// Find the first route in document order matching the request.
    pub fn find(&self, method: &Method, path: &str) -> Option<&CompiledRoute> {
        self.routes.iter().find(|r| r.matches(method, path))
    }

    /// Look up a cluster by id.
    pub fn cluster(&self, cluster_id: &str) -> Option<&CompiledCluster> {
        self.clusters.get(cluster_id)
    }
}

/// The gateway's live routing table: a hot-swappable generation slot.
///
/// Requests call [`RouteTable::snapshot`] once and dispatch against that
/// snapshot; a concurrent publish never affects an in-flight request. The
/// superseded generation is dropped when its last snapshot holder finishes.
#[derive(Debug)]
pub struct RouteTable {
    current: ArcSwap<RouteTableGeneration>,
    counter: AtomicU64,
}

impl RouteTable {
    /// Create a table serving the empty generation.
    pub fn empty() -> Self {
        Self {
            current: ArcSwap::from_pointee(RouteTableGeneration::empty()),
            counter: AtomicU64::new(0),
        }
    }

    /// Take a snapshot of the current generation.
    pub fn snapshot(&self) -> Arc<RouteTableGeneration> {
        self.current.load_full()
    }

    /// Publish compiled tables as the next generation. Returns its id.
    pub fn publish(&self, tables: CompiledTables) -> u64 {
        let generation = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        self.current.store(Arc::new(RouteTableGeneration {
            routes: tables.routes,
            clusters: tables.clusters,
            generation,
        }));
        generation
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(prefix: &str, cluster: &str) -> CompiledRoute {
        CompiledRoute {
            route_id: format!("{cluster}-route"),
            cluster_id: cluster.into(),
            path_prefix: prefix.into(),
            methods: None,
            auth_required: false,
            required_privileges: Vec::new(),
        }
    }

    #[test]
    fn test_prefix_and_method_match() {
        let mut r = route("/api", "a-cluster");
        r.methods = Some([Method::GET].into_iter().collect());
        assert!(r.matches(&Method::GET, "/api/v1"));
        assert!(!r.matches(&Method::POST, "/api/v1"));
        assert!(!r.matches(&Method::GET, "/images"));
    }

    #[test]
    fn test_prefix_matches_whole_segments_only() {
        let r = route("/api", "a-cluster");
        assert!(r.matches(&Method::GET, "/api"));
        assert!(r.matches(&Method::GET, "/api/"));
        assert!(r.matches(&Method::GET, "/api/v1/items"));
        // A longer first segment is a different resource, not a sub-path.
        assert!(!r.matches(&Method::GET, "/apiary"));
        assert!(!r.matches(&Method::GET, "/apix"));

        // A '/'-terminated prefix still matches its sub-paths.
        let slash = route("/api/", "a-cluster");
        assert!(slash.matches(&Method::GET, "/api/v1"));
        assert!(!slash.matches(&Method::GET, "/api"));
    }

    #[test]
    fn test_first_match_wins() {
        let generation = RouteTableGeneration {
            routes: vec![route("/api", "first-cluster"), route("/api", "second-cluster")],
            clusters: HashMap::new(),
            generation: 1,
        };
        let matched = generation.find(&Method::GET, "/api/x").unwrap();
        assert_eq!(matched.cluster_id, "first-cluster");
    }

    #[test]
    fn test_publish_is_monotonic_and_visible() {
        let table = RouteTable::empty();
        assert_eq!(table.snapshot().generation, 0);

        let before = table.snapshot();
        let g1 = table.publish(CompiledTables {
            routes: vec![route("/a", "a-cluster")],
            clusters: HashMap::new(),
        });
        let g2 = table.publish(CompiledTables::default());

        assert_eq!(g1, 1);
        assert_eq!(g2, 2);
        assert_eq!(table.snapshot().generation, 2);
        // The snapshot taken before the publishes is untouched.
        assert_eq!(before.generation, 0);
    }
}
