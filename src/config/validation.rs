//! Route document validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Reject entries with empty path or service
//! - Reject method names the HTTP layer cannot represent
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is a pure function: RouterConfig -> Result<(), Vec<ValidationError>>
//! - Runs before a document is compiled into a generation

use axum::http::Method;
use thiserror::Error;

use crate::config::schema::RouterConfig;

/// A single semantic problem found in a route document.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Route entry has an empty `path`.
    #[error("route #{index}: path must not be empty")]
    EmptyPath { index: usize },

    /// Route entry has an empty `service`.
    #[error("route #{index}: service must not be empty")]
    EmptyService { index: usize },

    /// Route entry has a `path` that does not start with '/'.
    #[error("route #{index}: path {path:?} must start with '/'")]
    RelativePath { index: usize, path: String },

    /// Route entry lists a method that is not a valid HTTP method token.
    #[error("route #{index}: invalid HTTP method {method:?}")]
    InvalidMethod { index: usize, method: String },
}

/// Validate a parsed route document.
///
/// Collects every problem rather than stopping at the first, so an operator
/// editing the document sees all mistakes in one reload attempt.
pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for (index, entry) in config.routes.iter().enumerate() {
        if entry.path.is_empty() {
            errors.push(ValidationError::EmptyPath { index });
        } else if !entry.path.starts_with('/') {
            errors.push(ValidationError::RelativePath {
                index,
                path: entry.path.clone(),
            });
        }

        if entry.service.is_empty() {
            errors.push(ValidationError::EmptyService { index });
        }

        for method in &entry.methods {
            if Method::from_bytes(method.to_ascii_uppercase().as_bytes()).is_err() {
                errors.push(ValidationError::InvalidMethod {
                    index,
                    method: method.clone(),
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::RouteEntry;

    fn entry(path: &str, service: &str) -> RouteEntry {
        RouteEntry {
            path: path.into(),
            service: service.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_config() {
        let config = RouterConfig {
            routes: vec![entry("/api/widgets", "widgets")],
        };
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let config = RouterConfig {
            routes: vec![entry("", ""), entry("api/no-slash", "ok")],
        };
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::EmptyPath { index: 0 }));
        assert!(errors.contains(&ValidationError::EmptyService { index: 0 }));
    }

    #[test]
    fn test_invalid_method_rejected() {
        let mut e = entry("/a", "a");
        e.methods = vec!["GET".into(), "NOT A METHOD".into()];
        let config = RouterConfig { routes: vec![e] };
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::InvalidMethod {
                index: 0,
                method: "NOT A METHOD".into()
            }]
        );
    }
}
