//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ClientConfig (validated, immutable)
//!     → CLI flags / env override individual fields
//! ```
//!
//! # Design Decisions
//! - All fields have defaults so an absent file is a valid configuration
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_or_default, ConfigError};
pub use schema::{
    ApiConfig, AuthConfig, CacheConfig, ClientConfig, ObservabilityConfig, PaginationConfig,
};
