//! Resource data provider over the request client.
//!
//! # Responsibilities
//! - Bridge page/pageSize/sort/filter list requests onto the cursor-only list endpoint
//! - Map single-record CRUD calls to REST calls
//! - Fan out batch calls concurrently
//!
//! # List resolution
//! ```text
//! get_list(resource, params)
//!     → CursorKey (resource + page size + sorters + filters)
//!     → cursor for the requested page (first page cursor if unknown)
//!     → GET /{resource}?limit&cursor&sort&order&search
//!     → { total, data, nextCursor } normalized, nextCursor recorded for page + 1
//! ```

use std::sync::Arc;

use futures_util::future::try_join_all;
use reqwest::Method;
use serde_json::Value;

use crate::data::cursor::{CursorKey, CursorTable};
use crate::data::types::{ListParams, ListResponse};
use crate::http::{ApiClient, ApiRequest, ApiResult};
use crate::observability::metrics;

/// CRUD access to backend resources.
///
/// Owns its cursor table; drop the provider (or call [`reset`](Self::reset))
/// when the list view that used it goes away.
#[derive(Debug, Clone)]
pub struct DataProvider {
    client: ApiClient,
    cursors: Arc<CursorTable>,
}

impl DataProvider {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            cursors: Arc::new(CursorTable::new()),
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Fetch one page of `resource`.
    ///
    /// A page whose cursor was never recorded (its predecessor was not
    /// fetched under the same query shape) is served from the start of the
    /// sequence instead of failing.
    pub async fn get_list(&self, resource: &str, params: &ListParams) -> ApiResult<ListResponse> {
        let key = CursorKey::new(resource, params);
        let page = params.pagination.current_page.max(1);
        let lease = self.cursors.begin(&key, page);

        if !lease.is_known() {
            metrics::record_cursor_fallback(resource);
            tracing::warn!(
                resource,
                page,
                key = %key,
                "No cursor recorded for page, fetching from the start"
            );
        }

        let mut request = ApiRequest::get(collection_path(resource))
            .query("limit", params.pagination.page_size.max(1).to_string())
            .headers(params.headers.iter().cloned());

        if let Some(cursor) = lease.cursor() {
            request = request.query("cursor", cursor);
        }
        if let Some(sorter) = params.primary_sorter() {
            request = request
                .query("sort", sorter.field.as_str())
                .query("order", sorter.order.as_str());
        }
        if let Some(search) = params.search_text() {
            request = request.query("search", search);
        }

        let body = self.client.execute(&request).await?;
        let (response, next_cursor) = normalize_list(&body);

        if !self.cursors.record(&lease, next_cursor) {
            tracing::debug!(resource, page, "Cursor not recorded for superseded or fallback fetch");
        }

        Ok(response)
    }

    pub async fn get_one(&self, resource: &str, id: &str) -> ApiResult<Value> {
        self.client
            .execute(&record_request(Method::GET, resource, id))
            .await
    }

    pub async fn get_many(&self, resource: &str, ids: &[String]) -> ApiResult<Vec<Value>> {
        try_join_all(ids.iter().map(|id| self.get_one(resource, id))).await
    }

    pub async fn create(&self, resource: &str, variables: Value) -> ApiResult<Value> {
        self.client
            .post(&collection_path(resource), variables)
            .await
    }

    pub async fn update(&self, resource: &str, id: &str, variables: Value) -> ApiResult<Value> {
        let request = record_request(Method::PATCH, resource, id).json(variables);
        self.client.execute(&request).await
    }

    pub async fn update_many(
        &self,
        resource: &str,
        ids: &[String],
        variables: Value,
    ) -> ApiResult<Vec<Value>> {
        try_join_all(
            ids.iter()
                .map(|id| self.update(resource, id, variables.clone())),
        )
        .await
    }

    pub async fn delete_one(&self, resource: &str, id: &str) -> ApiResult<Value> {
        self.client
            .execute(&record_request(Method::DELETE, resource, id))
            .await
    }

    pub async fn delete_many(&self, resource: &str, ids: &[String]) -> ApiResult<Vec<Value>> {
        try_join_all(ids.iter().map(|id| self.delete_one(resource, id))).await
    }

    /// Arbitrary call through the same client (token, refresh, retry).
    pub async fn custom(&self, request: &ApiRequest) -> ApiResult<Value> {
        self.client.execute(request).await
    }

    /// Highest page of this query shape that can be fetched without falling back.
    pub fn highest_known_page(&self, resource: &str, params: &ListParams) -> u32 {
        self.cursors
            .highest_known_page(&CursorKey::new(resource, params))
    }

    /// Forget every pagination sequence of `resource`.
    pub fn discard(&self, resource: &str) {
        self.cursors.discard(resource);
    }

    /// Forget every pagination sequence.
    pub fn reset(&self) {
        self.cursors.reset();
    }
}

fn collection_path(resource: &str) -> String {
    format!("/{}", resource.trim_matches('/'))
}

/// `/{resource}/{id}` with the id escaped as a single path segment.
fn record_request(method: Method, resource: &str, id: &str) -> ApiRequest {
    ApiRequest::new(method, collection_path(resource)).segment(id)
}

/// Split a list body into the page and the next cursor.
///
/// Malformed fields default instead of failing: `total` to 0, `data` to an
/// empty page, `nextCursor` to none.
fn normalize_list(body: &Value) -> (ListResponse, Option<String>) {
    let total = body.get("total").map(coerce_total).unwrap_or(0);
    let data = body
        .get("data")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    let next_cursor = body
        .get("nextCursor")
        .and_then(Value::as_str)
        .filter(|c| !c.is_empty())
        .map(str::to_string);

    (ListResponse { total, data }, next_cursor)
}

fn coerce_total(value: &Value) -> u64 {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if s.trim().is_empty() => Some(0.0),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match number {
        Some(n) if n.is_finite() && n > 0.0 => n as u64,
        _ => 0,
    }
}
