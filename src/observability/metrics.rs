//! Metrics collection.
//!
//! # Metrics
//! - `admin_client_requests_total` (counter): outbound requests by method, status
//! - `admin_client_token_refresh_total` (counter): refresh attempts by outcome
//! - `admin_client_cache_lookups_total` (counter): cache lookups by result
//! - `admin_client_cursor_fallback_total` (counter): list pages served from the first cursor

use metrics::counter;

/// Record a completed HTTP exchange. `status` is `"error"` for transport failures.
pub fn record_request(method: &str, status: &str) {
    counter!(
        "admin_client_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record the outcome of a token refresh ("success" or "failure").
pub fn record_token_refresh(outcome: &'static str) {
    counter!("admin_client_token_refresh_total", "outcome" => outcome).increment(1);
}

/// Record a cache lookup.
pub fn record_cache_lookup(hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    counter!("admin_client_cache_lookups_total", "result" => result).increment(1);
}

/// Record a list request whose page had no known cursor.
pub fn record_cursor_fallback(resource: &str) {
    counter!("admin_client_cursor_fallback_total", "resource" => resource.to_string()).increment(1);
}
