//! Read-through caching for lookups that change rarely (channel lists).
//!
//! Entries expire after a TTL and can be dropped by exact key or key prefix.

pub mod ttl;

pub use ttl::{CacheOptions, TtlCache, DEFAULT_TTL};
