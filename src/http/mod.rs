//! HTTP subsystem.
//!
//! # Data Flow
//! ```text
//! caller builds ApiRequest (request.rs)
//!     → client.rs attaches bearer token from the token store
//!     → reqwest exchange
//!     → 401: single-flight refresh, one replay
//!     → JSON body or ApiError (error.rs)
//! ```

pub mod client;
pub mod error;
pub mod request;

pub use client::ApiClient;
pub use error::{ApiError, ApiResult};
pub use request::ApiRequest;
