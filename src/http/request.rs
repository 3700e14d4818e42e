//! Outbound request description.

use reqwest::Method;
use serde_json::Value;
use url::Url;

use crate::http::error::{ApiError, ApiResult};

/// A request relative to the configured base URL.
///
/// Kept as plain data so the client can replay it after a token refresh.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Resource path (`/users/1`, `promo-cats/settings`) or an absolute URL.
    pub path: String,
    /// Extra path segments, percent-encoded when the URL is built.
    pub segments: Vec<String>,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub headers: Vec<(String, String)>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            segments: Vec::new(),
            query: Vec::new(),
            body: None,
            headers: Vec::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Append one path segment; `/`, `?` and `#` in it stay literal.
    pub fn segment(mut self, segment: impl Into<String>) -> Self {
        self.segments.push(segment.into());
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Resolve against `base`, joining with exactly one slash and appending the query.
    pub fn url(&self, base: &Url) -> ApiResult<Url> {
        let mut url = if self.path.starts_with("http://") || self.path.starts_with("https://") {
            Url::parse(&self.path)
        } else {
            Url::parse(&format!(
                "{}/{}",
                base.as_str().trim_end_matches('/'),
                self.path.trim_start_matches('/')
            ))
        }
        .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", self.path, e)))?;

        if !self.segments.is_empty() {
            url.path_segments_mut()
                .map_err(|()| ApiError::InvalidUrl(format!("{}: not a base URL", self.path)))?
                .pop_if_empty()
                .extend(&self.segments);
        }
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&self.query);
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("http://localhost:3000/api").unwrap()
    }

    #[test]
    fn test_join_with_and_without_slash() {
        let a = ApiRequest::get("/users/1").url(&base()).unwrap();
        let b = ApiRequest::get("promo-cats/settings").url(&base()).unwrap();
        assert_eq!(a.as_str(), "http://localhost:3000/api/users/1");
        assert_eq!(b.as_str(), "http://localhost:3000/api/promo-cats/settings");
    }

    #[test]
    fn test_trailing_slash_kept() {
        let url = ApiRequest::get("/channels/promo-cat/").url(&base()).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api/channels/promo-cat/");
    }

    #[test]
    fn test_query_encoding() {
        let url = ApiRequest::get("/users")
            .query("limit", "10")
            .query("search", "john doe")
            .url(&base())
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:3000/api/users?limit=10&search=john+doe"
        );
    }

    #[test]
    fn test_segments_are_escaped() {
        let url = ApiRequest::get("/users")
            .segment("a/b?c#d")
            .segment("give-xp")
            .url(&base())
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:3000/api/users/a%2Fb%3Fc%23d/give-xp"
        );
    }

    #[test]
    fn test_segment_after_trailing_slash() {
        let url = ApiRequest::post("/channels/promo-cat/")
            .segment("42")
            .url(&base())
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api/channels/promo-cat/42");
    }

    #[test]
    fn test_absolute_url_passthrough() {
        let url = ApiRequest::get("https://cdn.example.com/x").url(&base()).unwrap();
        assert_eq!(url.host_str(), Some("cdn.example.com"));
    }
}
