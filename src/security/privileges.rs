//! Privilege assertion parsing and the authorization decision.
//!
//! Callers assert privileges through the `X-Ultramarine-Privileges` header,
//! a comma-separated list of opaque tokens. Routes require a set of
//! privileges; authorization passes iff every required token is asserted.

use std::collections::HashSet;

use axum::http::HeaderValue;

/// Request header carrying the caller's asserted privileges.
pub const PRIVILEGES_HEADER: &str = "x-ultramarine-privileges";

/// The set of privilege tokens a caller asserted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrivilegeSet {
    tokens: HashSet<String>,
}

impl PrivilegeSet {
    /// Parse the assertion header. An absent or unreadable header is the
    /// empty set; tokens are trimmed and empty tokens dropped.
    pub fn from_header(value: Option<&HeaderValue>) -> Self {
        let tokens = value
            .and_then(|v| v.to_str().ok())
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        Self { tokens }
    }

    pub fn contains(&self, privilege: &str) -> bool {
        self.tokens.contains(privilege)
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Required privileges the caller did not assert, in required order.
    pub fn missing<'a>(&self, required: &'a [String]) -> Vec<&'a str> {
        required
            .iter()
            .filter(|p| !self.contains(p))
            .map(String::as_str)
            .collect()
    }
}

/// Decide whether an asserted privilege set satisfies a route's policy.
///
/// Pure function. If the route does not require authorization the answer is
/// always yes. If it does, every required privilege must be asserted; a
/// required-but-empty privilege list is unsatisfiable and denies everyone.
pub fn authorize(required: bool, required_privileges: &[String], asserted: &PrivilegeSet) -> bool {
    if !required {
        return true;
    }
    if required_privileges.is_empty() {
        return false;
    }
    required_privileges.iter().all(|p| asserted.contains(p))
}
