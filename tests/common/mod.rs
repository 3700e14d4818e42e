//! Shared mock backend for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use loremo_admin::config::ApiConfig;
use loremo_admin::{ApiClient, MemoryTokenStore, TokenStore};

/// One request as the backend saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    /// Raw (still percent-encoded) path.
    pub path: String,
    pub query: HashMap<String, String>,
    pub body: Value,
}

/// Programmable stand-in for the back-office API.
pub struct MockBackend {
    /// Bearer token resources accept.
    pub valid_token: Mutex<String>,
    /// Token handed out by `/refresh`.
    pub refreshed_token: String,
    pub refresh_succeeds: AtomicBool,
    /// Refresh only works with the cookie set at login.
    pub require_session_cookie: AtomicBool,
    /// Resources answer 401 whatever the token.
    pub reject_all: AtomicBool,
    pub refresh_delay: Duration,
    pub refresh_calls: AtomicU32,
    pub channel_calls: AtomicU32,
    pub resource_calls: AtomicU32,
    pub list_queries: Mutex<Vec<HashMap<String, String>>>,
    pub list_headers: Mutex<Vec<HeaderMap>>,
    /// Requests to the auxiliary routes, in arrival order.
    pub recorded: Mutex<Vec<Recorded>>,
    pub total_users: usize,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            valid_token: Mutex::new("fresh".to_string()),
            refreshed_token: "fresh".to_string(),
            refresh_succeeds: AtomicBool::new(true),
            require_session_cookie: AtomicBool::new(false),
            reject_all: AtomicBool::new(false),
            refresh_delay: Duration::from_millis(200),
            refresh_calls: AtomicU32::new(0),
            channel_calls: AtomicU32::new(0),
            resource_calls: AtomicU32::new(0),
            list_queries: Mutex::new(Vec::new()),
            list_headers: Mutex::new(Vec::new()),
            recorded: Mutex::new(Vec::new()),
            total_users: 42,
        }
    }

    pub fn refresh_count(&self) -> u32 {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> Vec<HashMap<String, String>> {
        self.list_queries.lock().unwrap().clone()
    }

    pub fn recorded(&self) -> Vec<Recorded> {
        self.recorded.lock().unwrap().clone()
    }

    fn record(&self, method: Method, uri: &Uri, query: HashMap<String, String>, body: Value) {
        self.recorded.lock().unwrap().push(Recorded {
            method,
            path: uri.path().to_string(),
            query,
            body,
        });
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        if self.reject_all.load(Ordering::SeqCst) {
            return false;
        }
        let expected = format!("Bearer {}", self.valid_token.lock().unwrap());
        headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .is_some_and(|h| h == expected)
    }
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, "resource unauthorized").into_response()
}

async fn login(State(state): State<Arc<MockBackend>>, Json(body): Json<Value>) -> Response {
    if body.get("password").and_then(Value::as_str) != Some("secret") {
        return (StatusCode::UNAUTHORIZED, "bad password").into_response();
    }
    *state.valid_token.lock().unwrap() = "login-token".to_string();
    (
        [(header::SET_COOKIE, "session=s1; Path=/; HttpOnly")],
        Json(json!({ "access_token": "login-token" })),
    )
        .into_response()
}

async fn refresh(State(state): State<Arc<MockBackend>>, headers: HeaderMap) -> Response {
    state.refresh_calls.fetch_add(1, Ordering::SeqCst);
    tokio::time::sleep(state.refresh_delay).await;

    if !state.refresh_succeeds.load(Ordering::SeqCst) {
        return (StatusCode::UNAUTHORIZED, "refresh denied").into_response();
    }
    if state.require_session_cookie.load(Ordering::SeqCst) {
        let has_cookie = headers
            .get(header::COOKIE)
            .and_then(|h| h.to_str().ok())
            .is_some_and(|c| c.contains("session=s1"));
        if !has_cookie {
            return (StatusCode::UNAUTHORIZED, "no session").into_response();
        }
    }

    *state.valid_token.lock().unwrap() = state.refreshed_token.clone();
    Json(json!({ "access_token": state.refreshed_token })).into_response()
}

async fn list_users(
    State(state): State<Arc<MockBackend>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    state.resource_calls.fetch_add(1, Ordering::SeqCst);
    if !state.authorized(&headers) {
        return unauthorized();
    }
    state.list_queries.lock().unwrap().push(query.clone());
    state.list_headers.lock().unwrap().push(headers);

    let mut users: Vec<Value> = (1..=state.total_users)
        .map(|id| json!({ "id": id, "username": format!("user{id}") }))
        .collect();
    if let Some(search) = query.get("search") {
        users.retain(|u| u["username"].as_str().unwrap().contains(search.as_str()));
    }
    if query.get("sort").map(String::as_str) == Some("id")
        && query.get("order").map(String::as_str) == Some("desc")
    {
        users.reverse();
    }

    let limit: usize = query.get("limit").and_then(|l| l.parse().ok()).unwrap_or(10);
    let start: usize = query
        .get("cursor")
        .and_then(|c| c.strip_prefix("after-"))
        .and_then(|n| n.parse().ok())
        .unwrap_or(0);
    let end = (start + limit).min(users.len());
    let page = users.get(start..end).map(<[Value]>::to_vec).unwrap_or_default();
    let next = (end < users.len()).then(|| format!("after-{end}"));

    Json(json!({ "total": users.len(), "data": page, "nextCursor": next })).into_response()
}

async fn user_record(
    State(state): State<Arc<MockBackend>>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Response {
    state.resource_calls.fetch_add(1, Ordering::SeqCst);
    if !state.authorized(&headers) {
        return unauthorized();
    }
    Json(json!({ "id": id, "username": format!("user{id}") })).into_response()
}

async fn patch_user(
    State(state): State<Arc<MockBackend>>,
    headers: HeaderMap,
    Path(id): Path<u64>,
    Json(body): Json<Value>,
) -> Response {
    if !state.authorized(&headers) {
        return unauthorized();
    }
    let mut user = json!({
        "id": id,
        "discord_id": format!("d{id}"),
        "username": format!("user{id}"),
        "roles": [],
        "total_xp": 0,
        "level": 1,
        "cookies": 0,
        "avatar": ""
    });
    if let (Some(user), Some(patch)) = (user.as_object_mut(), body.as_object()) {
        for (k, v) in patch {
            user.insert(k.clone(), v.clone());
        }
    }
    Json(user).into_response()
}

async fn give_xp(
    State(state): State<Arc<MockBackend>>,
    headers: HeaderMap,
    Path(id): Path<u64>,
    Json(body): Json<Value>,
) -> Response {
    if !state.authorized(&headers) {
        return unauthorized();
    }
    let xp = body.get("xp").and_then(Value::as_u64).unwrap_or(0);
    Json(json!({
        "id": id,
        "discord_id": format!("d{id}"),
        "username": format!("user{id}"),
        "total_xp": 100 + xp
    }))
    .into_response()
}

async fn channels(
    State(state): State<Arc<MockBackend>>,
    headers: HeaderMap,
    method: Method,
    uri: Uri,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if !state.authorized(&headers) {
        return unauthorized();
    }
    state.record(method, &uri, query, Value::Null);
    let n = state.channel_calls.fetch_add(1, Ordering::SeqCst) + 1;
    Json(json!([{ "id": "c1", "name": "news", "fetch": n }])).into_response()
}

async fn create_user(
    State(state): State<Arc<MockBackend>>,
    headers: HeaderMap,
    method: Method,
    uri: Uri,
    Json(body): Json<Value>,
) -> Response {
    if !state.authorized(&headers) {
        return unauthorized();
    }
    state.record(method, &uri, HashMap::new(), body.clone());
    let mut user = body;
    if let Some(user) = user.as_object_mut() {
        user.insert("id".to_string(), json!(state.total_users + 1));
    }
    (StatusCode::CREATED, Json(user)).into_response()
}

/// Any authorized request: record it and answer with a canned body.
fn recorded_route(
    state: &MockBackend,
    headers: &HeaderMap,
    method: Method,
    uri: Uri,
    query: HashMap<String, String>,
    body: Option<Json<Value>>,
    reply: Value,
) -> Response {
    if !state.authorized(headers) {
        return unauthorized();
    }
    let body = body.map(|Json(b)| b).unwrap_or(Value::Null);
    state.record(method, &uri, query, body);
    Json(reply).into_response()
}

async fn stats(
    State(state): State<Arc<MockBackend>>,
    headers: HeaderMap,
    method: Method,
    uri: Uri,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    recorded_route(&state, &headers, method, uri, query, None, json!({ "online": 3 }))
}

async fn note(
    State(state): State<Arc<MockBackend>>,
    headers: HeaderMap,
    method: Method,
    uri: Uri,
    Path(id): Path<String>,
) -> Response {
    recorded_route(&state, &headers, method, uri, HashMap::new(), None, json!({ "id": id }))
}

async fn get_promo_settings(
    State(state): State<Arc<MockBackend>>,
    headers: HeaderMap,
    method: Method,
    uri: Uri,
) -> Response {
    let reply = json!({ "channel_id": "c9", "post_time": "10:30" });
    recorded_route(&state, &headers, method, uri, HashMap::new(), None, reply)
}

async fn set_promo_settings(
    State(state): State<Arc<MockBackend>>,
    headers: HeaderMap,
    method: Method,
    uri: Uri,
    body: Json<Value>,
) -> Response {
    let reply = json!({ "ok": true });
    recorded_route(&state, &headers, method, uri, HashMap::new(), Some(body), reply)
}

async fn promo_images(
    State(state): State<Arc<MockBackend>>,
    headers: HeaderMap,
    method: Method,
    uri: Uri,
) -> Response {
    // Buffers arrive as index-keyed objects.
    let reply = json!([
        { "name": "cat.png", "preview": { "0": 104, "1": 105 } },
        { "name": "empty.png" }
    ]);
    recorded_route(&state, &headers, method, uri, HashMap::new(), None, reply)
}

async fn get_promo_channel(
    State(state): State<Arc<MockBackend>>,
    headers: HeaderMap,
    method: Method,
    uri: Uri,
) -> Response {
    let reply = json!({ "id": "c9", "name": "cats" });
    recorded_route(&state, &headers, method, uri, HashMap::new(), None, reply)
}

async fn set_promo_channel(
    State(state): State<Arc<MockBackend>>,
    headers: HeaderMap,
    method: Method,
    uri: Uri,
    Path(id): Path<String>,
) -> Response {
    let reply = json!({ "channel_id": id });
    recorded_route(&state, &headers, method, uri, HashMap::new(), None, reply)
}

async fn broken_list() -> Response {
    Json(json!({ "total": "lots", "data": null, "nextCursor": 12 })).into_response()
}

pub fn router(state: Arc<MockBackend>) -> Router {
    Router::new()
        .route("/api/login", post(login))
        .route("/api/refresh", post(refresh))
        .route("/api/users", get(list_users).post(create_user))
        .route(
            "/api/users/{id}",
            get(user_record).patch(patch_user).delete(user_record),
        )
        .route("/api/users/{id}/give-xp", post(give_xp))
        .route("/api/channels", get(channels))
        .route("/api/channels/promo-cat/", get(get_promo_channel))
        .route("/api/channels/promo-cat/{id}", post(set_promo_channel))
        .route("/api/promo-cats/settings", get(get_promo_settings).post(set_promo_settings))
        .route("/api/promo-cats/upload/images", get(promo_images))
        .route("/api/stats", get(stats))
        .route("/api/notes/{id}", get(note))
        .route("/api/broken", get(broken_list))
        .with_state(state)
}

/// Serve the mock on an ephemeral port; returns the API base URL.
pub async fn spawn_backend(state: Arc<MockBackend>) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.unwrap();
    });
    format!("http://{addr}/api")
}

/// Client against `base_url` whose store starts with `token`.
pub fn client_with_token(base_url: &str, token: Option<&str>) -> (ApiClient, Arc<MemoryTokenStore>) {
    let store = Arc::new(match token {
        Some(t) => MemoryTokenStore::with_token(t),
        None => MemoryTokenStore::new(),
    });
    let config = ApiConfig {
        base_url: base_url.to_string(),
        timeout_secs: 5,
        ..ApiConfig::default()
    };
    let tokens: Arc<dyn TokenStore> = store.clone();
    let client = ApiClient::new(&config, tokens).unwrap();
    (client, store)
}
