//! Channel lookups.
//!
//! The channel list is read by several views and changes rarely, so it goes
//! through a [`TtlCache`] keyed by the normalized query parameters.

use std::collections::BTreeMap;
use std::time::Duration;

use serde_json::Value;

use crate::api::models::Channel;
use crate::cache::{CacheOptions, TtlCache, DEFAULT_TTL};
use crate::http::{ApiClient, ApiRequest, ApiResult};

/// Cache key (and key prefix) of channel list lookups.
pub const CHANNELS_CACHE_KEY: &str = "channels";

/// Query parameters of `GET /channels`. Null values are dropped.
pub type ChannelParams = BTreeMap<String, Value>;

#[derive(Debug, Clone, Default)]
pub struct ChannelQuery {
    pub params: Option<ChannelParams>,
    pub ttl: Option<Duration>,
    pub force_refresh: bool,
}

#[derive(Debug, Clone)]
pub struct ChannelsApi {
    client: ApiClient,
    cache: TtlCache<Vec<Channel>>,
    default_ttl: Duration,
}

impl ChannelsApi {
    pub fn new(client: ApiClient) -> Self {
        Self::with_cache(client, TtlCache::new(), DEFAULT_TTL)
    }

    pub fn with_cache(client: ApiClient, cache: TtlCache<Vec<Channel>>, default_ttl: Duration) -> Self {
        Self {
            client,
            cache,
            default_ttl,
        }
    }

    pub fn cache(&self) -> &TtlCache<Vec<Channel>> {
        &self.cache
    }

    /// `GET /channels`, served from the cache while fresh.
    pub async fn fetch_channels(&self, query: &ChannelQuery) -> ApiResult<Vec<Channel>> {
        let key = cache_key(query.params.as_ref());
        let options = CacheOptions {
            ttl: query.ttl.unwrap_or(self.default_ttl),
            force_refresh: query.force_refresh,
        };

        let mut request = ApiRequest::get("/channels");
        for (name, value) in normalized(query.params.as_ref()) {
            request = request.query(name, query_value(&value));
        }

        self.cache
            .with_cache(&key, || self.client.send(&request), options)
            .await
    }

    /// Drop cached channel lists: all of them when `all` is set or no params
    /// are given, otherwise only the one for `params`.
    pub fn clear_channels_cache(&self, params: Option<&ChannelParams>, all: bool) {
        match params {
            Some(params) if !all => self.cache.clear(Some(&cache_key(Some(params)))),
            _ => self.cache.clear_by_prefix(CHANNELS_CACHE_KEY),
        }
    }

    /// `GET /channels/promo-cat/`: the channel promo-cat posts go to.
    pub async fn get_promo_cat_channel(&self) -> ApiResult<Channel> {
        self.client.send(&ApiRequest::get("/channels/promo-cat/")).await
    }

    pub async fn set_promo_cat_channel(&self, id: &str) -> ApiResult<Value> {
        self.client
            .execute(&ApiRequest::post("/channels/promo-cat").segment(id))
            .await
    }
}

fn normalized(params: Option<&ChannelParams>) -> BTreeMap<String, Value> {
    params
        .map(|params| {
            params
                .iter()
                .filter(|(_, value)| !value.is_null())
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect()
        })
        .unwrap_or_default()
}

/// `channels` without params, `channels::<sorted JSON>` with them.
fn cache_key(params: Option<&ChannelParams>) -> String {
    match params {
        None => CHANNELS_CACHE_KEY.to_string(),
        Some(_) => {
            let serialized = serde_json::to_string(&normalized(params)).unwrap_or_default();
            format!("{CHANNELS_CACHE_KEY}::{serialized}")
        }
    }
}

fn query_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
