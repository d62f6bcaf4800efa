//! Route document schema definitions.
//!
//! This module defines the declarative route document the gateway consumes.
//! All types derive Serde traits for deserialization from YAML; every
//! optional field has a documented default so minimal documents parse.

use serde::{Deserialize, Serialize};

/// Root of the route document: an ordered list of route entries.
///
/// Document order is preserved. When two entries share a path prefix the
/// first one in document order wins at request time.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct RouterConfig {
    /// Route definitions mapping path prefixes to backend services.
    pub routes: Vec<RouteEntry>,
}

/// One declarative rule mapping a path prefix and method set to a backend
/// service, with an attached authorization policy.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct RouteEntry {
    /// URL path prefix to match (e.g. "/api/widgets"). Must be non-empty.
    pub path: String,

    /// Logical backend service name. Must be non-empty.
    pub service: String,

    /// HTTP methods this route accepts. Empty means all methods.
    pub methods: Vec<String>,

    /// Authorization policy for this route.
    pub auth: AuthPolicy,
}

/// Privilege requirements attached to a route.
///
/// `required = true` with an empty privilege list is a reachable but
/// unsatisfiable policy: the compiled route denies every caller.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct AuthPolicy {
    /// Whether callers must assert privileges to use this route.
    pub required: bool,

    /// Privileges a caller must assert. All of them must be present.
    pub privileges: Vec<String>,
}
