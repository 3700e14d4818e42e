//! Loremo back-office data client.
//!
//! # Architecture Overview
//!
//! ```text
//!   list / detail views, CLI
//!            │
//!            ▼
//!   ┌──────────────────┐      ┌──────────────┐
//!   │  data::provider  │─────▶│ data::cursor │  page → cursor per query shape
//!   └────────┬─────────┘      └──────────────┘
//!            │
//!            ▼
//!   ┌──────────────────┐      ┌──────────────┐
//!   │   http::client   │─────▶│ auth::refresh│  single-flight token refresh
//!   └────────┬─────────┘      └──────────────┘
//!            │  Authorization: Bearer <token>   (auth::storage)
//!            ▼
//!        backend REST API
//!
//!   api::*  ── typed helpers, channel lookups cached via cache::ttl
//! ```

// Core subsystems
pub mod auth;
pub mod data;
pub mod http;

// Supporting helpers
pub mod api;
pub mod cache;

// Cross-cutting concerns
pub mod config;
pub mod observability;

pub use auth::{FileTokenStore, MemoryTokenStore, Session, TokenStore};
pub use cache::{CacheOptions, TtlCache};
pub use config::ClientConfig;
pub use data::{DataProvider, Filter, ListParams, ListResponse, SortOrder};
pub use http::{ApiClient, ApiError, ApiRequest, ApiResult};
