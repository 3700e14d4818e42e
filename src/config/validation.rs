//! Configuration validation.
//!
//! Serde handles syntax; this checks value ranges and URLs. Every problem is
//! reported, not just the first one.

use std::fmt;

use url::Url;

use crate::config::schema::ClientConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field, e.g. `api.base_url`.
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match Url::parse(&config.api.base_url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(ValidationError {
            field: "api.base_url",
            message: format!("unsupported scheme '{}'", url.scheme()),
        }),
        Err(e) => errors.push(ValidationError {
            field: "api.base_url",
            message: format!("invalid URL '{}': {}", config.api.base_url, e),
        }),
    }

    if config.api.timeout_secs == 0 {
        errors.push(ValidationError {
            field: "api.timeout_secs",
            message: "must be greater than zero".to_string(),
        });
    }

    if config.auth.token_key.trim().is_empty() {
        errors.push(ValidationError {
            field: "auth.token_key",
            message: "must not be empty".to_string(),
        });
    }

    if config.pagination.default_page_size == 0 {
        errors.push(ValidationError {
            field: "pagination.default_page_size",
            message: "must be at least 1".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
