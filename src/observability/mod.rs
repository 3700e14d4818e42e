//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! http client, cursor bridge, cache produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (counters via the `metrics` facade)
//! ```
//!
//! # Design Decisions
//! - Structured fields, never interpolated secrets (tokens are not logged)
//! - Metrics are no-ops until the embedding application installs a recorder

pub mod logging;
pub mod metrics;
