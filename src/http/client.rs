//! Resilient request client.
//!
//! # Responsibilities
//! - Attach `Authorization: Bearer <token>` from the token store to every request
//! - On a 401, run at most one refresh at a time and replay each failed request once
//! - Pass every other failure through unchanged
//!
//! # Refresh protocol
//! ```text
//! request → 401 ──┬─ coordinator idle ──→ leader: POST /refresh
//!                 │                         ├─ ok:  store token, wake followers, replay
//!                 │                         └─ err: wake followers, fail with own 401
//!                 └─ refresh in flight ──→ follower: wait
//!                                           ├─ token: replay
//!                                           └─ none:  fail with own 401
//! replay → 401   ─→ fail (never a second refresh cycle)
//! ```

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

use crate::auth::refresh::{RefreshCoordinator, Ticket};
use crate::auth::storage::TokenStore;
use crate::config::ApiConfig;
use crate::http::error::{ApiError, ApiResult};
use crate::http::request::ApiRequest;
use crate::observability::metrics;

/// Body of `/login` and `/refresh` responses.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

/// Whether a request is on its first try or its single post-refresh replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    First,
    Retry,
}

struct Inner {
    http: reqwest::Client,
    base_url: Url,
    login_path: String,
    refresh_path: String,
    tokens: Arc<dyn TokenStore>,
    refresh: RefreshCoordinator,
}

/// HTTP client with bearer-token injection and single-flight refresh.
///
/// Cheap to clone; clones share the cookie jar, the token store and the
/// refresh coordinator.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<Inner>,
}

impl ApiClient {
    /// Create a client for the configured backend.
    ///
    /// The cookie jar is enabled so the session cookie set at login is sent
    /// with refresh calls.
    pub fn new(config: &ApiConfig, tokens: Arc<dyn TokenStore>) -> ApiResult<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;

        let mut default_headers = reqwest::header::HeaderMap::new();
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .cookie_store(true)
            .default_headers(default_headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        tracing::debug!(base_url = %base_url, "API client initialized");

        Ok(Self {
            inner: Arc::new(Inner {
                http,
                base_url,
                login_path: config.login_path.clone(),
                refresh_path: config.refresh_path.clone(),
                tokens,
                refresh: RefreshCoordinator::new(),
            }),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    pub fn token_store(&self) -> &Arc<dyn TokenStore> {
        &self.inner.tokens
    }

    /// Whether a refresh is currently in flight.
    pub fn is_refreshing(&self) -> bool {
        self.inner.refresh.is_refreshing()
    }

    /// Send a request, refreshing the token and replaying once on 401.
    pub async fn execute(&self, request: &ApiRequest) -> ApiResult<Value> {
        let token = self.inner.tokens.load();
        match self.dispatch(request, token.as_deref(), Attempt::First).await {
            Err(err) if err.is_unauthorized() => self.refresh_and_retry(request, err).await,
            other => other,
        }
    }

    /// Like [`execute`](Self::execute), decoding the body into `T`.
    pub async fn send<T: DeserializeOwned>(&self, request: &ApiRequest) -> ApiResult<T> {
        let body = self.execute(request).await?;
        Ok(serde_json::from_value(body)?)
    }

    pub async fn get(&self, path: &str) -> ApiResult<Value> {
        self.execute(&ApiRequest::get(path)).await
    }

    pub async fn post(&self, path: &str, body: Value) -> ApiResult<Value> {
        self.execute(&ApiRequest::post(path).json(body)).await
    }

    pub async fn patch(&self, path: &str, body: Value) -> ApiResult<Value> {
        self.execute(&ApiRequest::patch(path).json(body)).await
    }

    pub async fn delete(&self, path: &str) -> ApiResult<Value> {
        self.execute(&ApiRequest::delete(path)).await
    }

    /// Exchange the admin password for a bearer token and persist it.
    pub async fn login(&self, password: &str) -> ApiResult<()> {
        let request = ApiRequest::post(self.inner.login_path.as_str())
            .json(json!({ "password": password }));
        let body = self.dispatch(&request, None, Attempt::First).await?;
        let token = extract_token(body)?;
        self.inner.tokens.store(&token)?;
        tracing::info!("Logged in");
        Ok(())
    }

    /// Forget the stored token.
    pub fn logout(&self) -> ApiResult<()> {
        self.inner.tokens.remove()?;
        tracing::info!("Logged out");
        Ok(())
    }

    async fn refresh_and_retry(&self, request: &ApiRequest, original: ApiError) -> ApiResult<Value> {
        let token = match self.inner.refresh.acquire_or_enqueue() {
            Ticket::Leader(guard) => match self.refresh_access_token().await {
                Ok(token) => {
                    let woken = guard.settle(Some(token.clone()));
                    tracing::debug!(queued = woken, "Replaying requests with refreshed token");
                    token
                }
                Err(e) => {
                    let woken = guard.settle(None);
                    tracing::warn!(error = %e, queued = woken, "Token refresh failed");
                    return Err(original);
                }
            },
            Ticket::Follower(rx) => match rx.await {
                Ok(Some(token)) => token,
                _ => return Err(original),
            },
        };

        self.dispatch(request, Some(&token), Attempt::Retry).await
    }

    /// Call the refresh endpoint and persist the token it returns.
    async fn refresh_access_token(&self) -> ApiResult<String> {
        tracing::info!("Access token rejected, refreshing");
        let request = ApiRequest::post(self.inner.refresh_path.as_str());
        let outcome = self
            .dispatch(&request, None, Attempt::First)
            .await
            .and_then(extract_token);

        match outcome {
            Ok(token) => {
                metrics::record_token_refresh("success");
                if let Err(e) = self.inner.tokens.store(&token) {
                    // The token is still usable for this process.
                    tracing::error!(error = %e, "Failed to persist refreshed token");
                }
                Ok(token)
            }
            Err(e) => {
                metrics::record_token_refresh("failure");
                Err(e)
            }
        }
    }

    /// One HTTP exchange. Non-2xx statuses become [`ApiError::Status`].
    async fn dispatch(
        &self,
        request: &ApiRequest,
        token: Option<&str>,
        attempt: Attempt,
    ) -> ApiResult<Value> {
        let url = request.url(&self.inner.base_url)?;
        let request_id = uuid::Uuid::new_v4().to_string();

        let mut builder = self
            .inner
            .http
            .request(request.method.clone(), url.clone())
            .header("x-request-id", request_id.as_str());

        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        for (name, value) in &request.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| ApiError::InvalidHeader(name.clone()))?;
            let value = HeaderValue::from_str(value)
                .map_err(|_| ApiError::InvalidHeader(name.as_str().to_string()))?;
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                metrics::record_request(request.method.as_str(), "error");
                tracing::warn!(request_id = %request_id, url = %url, error = %e, "Request failed");
                return Err(e.into());
            }
        };

        let status = response.status();
        metrics::record_request(request.method.as_str(), status.as_str());
        tracing::debug!(
            request_id = %request_id,
            method = %request.method,
            url = %url,
            status = status.as_u16(),
            retry = attempt == Attempt::Retry,
            "Request completed"
        );

        let text = response.text().await?;
        if !status.is_success() {
            let message = if text.trim().is_empty() {
                status.canonical_reason().unwrap_or("Request failed").to_string()
            } else {
                text
            };
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("refreshing", &self.inner.refresh.is_refreshing())
            .finish()
    }
}

fn extract_token(body: Value) -> ApiResult<String> {
    let response: TokenResponse = serde_json::from_value(body)?;
    response
        .access_token
        .filter(|t| !t.is_empty())
        .ok_or(ApiError::MissingToken)
}
