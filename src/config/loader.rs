//! Route document loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::RouterConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for route document loading.
///
/// None of these are fatal to a running gateway: the caller decides whether
/// to keep the previously published generation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] serde_yml::Error),

    #[error("validation failed: {}", format_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate a route document from its textual contents.
///
/// An empty (or whitespace-only) document is treated as a document with no
/// routes, matching how the original tooling treats a null document.
pub fn parse_router_config(contents: &str) -> Result<RouterConfig, ConfigError> {
    if contents.trim().is_empty() {
        return Ok(RouterConfig::default());
    }

    let config: RouterConfig = serde_yml::from_str(contents)?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Load and validate a route document from a file.
pub fn load_router_config(path: &Path) -> Result<RouterConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    parse_router_config(&contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_empty_config() {
        let config = parse_router_config("").unwrap();
        assert!(config.routes.is_empty());
        let config = parse_router_config("   \n").unwrap();
        assert!(config.routes.is_empty());
    }

    #[test]
    fn test_malformed_document_is_parse_error() {
        let err = parse_router_config("routes: [:::").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_invalid_entry_is_validation_error() {
        let err = parse_router_config("routes:\n  - path: /a\n    service: \"\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("service"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_router_config(Path::new("/nonexistent/router.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
