//! Error types surfaced by the request client.

use thiserror::Error;

use crate::auth::storage::StorageError;

/// Errors returned by every client call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend answered with a non-2xx status. `message` is the response
    /// body, or the canonical reason when the body was empty.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// Connection, TLS or timeout failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("invalid header '{0}'")]
    InvalidHeader(String),

    /// The body was not the JSON shape the caller asked for.
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Login or refresh succeeded but carried no `access_token`.
    #[error("authentication response carried no access token")]
    MissingToken,

    #[error("token storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ApiError {
    /// HTTP status of a backend rejection, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Status { status: 401, .. })
    }
}

/// Result type for client operations.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiError::Status {
            status: 401,
            message: "Unauthorized".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 401: Unauthorized");
        assert_eq!(err.status(), Some(401));
        assert!(err.is_unauthorized());
    }

    #[test]
    fn test_non_status_errors() {
        let err = ApiError::MissingToken;
        assert_eq!(err.status(), None);
        assert!(!err.is_unauthorized());

        let err = ApiError::Status {
            status: 403,
            message: "Forbidden".to_string(),
        };
        assert!(!err.is_unauthorized());
    }
}
