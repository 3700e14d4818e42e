//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the admin client.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the admin client.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ClientConfig {
    /// Backend API settings (base URL, endpoints, transport timeout).
    pub api: ApiConfig,

    /// Token persistence settings.
    pub auth: AuthConfig,

    /// Read-through cache settings.
    pub cache: CacheConfig,

    /// List pagination settings.
    pub pagination: PaginationConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Backend API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL every resource path is joined onto.
    pub base_url: String,

    /// Transport timeout for a single HTTP exchange, in seconds.
    pub timeout_secs: u64,

    /// Path of the password login endpoint.
    pub login_path: String,

    /// Path of the cookie-authenticated token refresh endpoint.
    pub refresh_path: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/api".to_string(),
            timeout_secs: 30,
            login_path: "/login".to_string(),
            refresh_path: "/refresh".to_string(),
        }
    }
}

/// Where and under which key the bearer token is persisted.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Fixed key of the token inside the credentials file.
    pub token_key: String,

    /// Path of the credentials file.
    pub token_path: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_key: "refine-auth".to_string(),
            token_path: ".loremo/credentials.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Default time-to-live of cached lookups in milliseconds.
    pub default_ttl_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl_ms: 60_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Page size used when a list request does not name one.
    pub default_page_size: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: 10,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
