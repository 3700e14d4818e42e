//! Short-lived read-through cache.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;

use crate::observability::metrics;

/// Default lifetime of a cached value.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    data: V,
    expires_at: Instant,
}

/// Options for [`TtlCache::with_cache`].
#[derive(Debug, Clone, Copy)]
pub struct CacheOptions {
    pub ttl: Duration,
    /// Skip the lookup and always call the fetcher.
    pub force_refresh: bool,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            force_refresh: false,
        }
    }
}

impl CacheOptions {
    pub fn ttl_ms(ms: u64) -> Self {
        Self {
            ttl: Duration::from_millis(ms),
            ..Self::default()
        }
    }

    pub fn force_refresh(mut self, force: bool) -> Self {
        self.force_refresh = force;
        self
    }
}

/// A thread-safe map of `key -> (value, expiry)`.
///
/// Clones share the same entries.
#[derive(Debug, Clone)]
pub struct TtlCache<V> {
    inner: Arc<DashMap<String, CacheEntry<V>>>,
}

impl<V> Default for TtlCache<V> {
    fn default() -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
        }
    }
}

impl<V: Clone> TtlCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the live cached value for `key`, or run `fetcher` and cache its result.
    ///
    /// A fetcher error is returned as-is and leaves the cache untouched.
    pub async fn with_cache<F, Fut, E>(
        &self,
        key: &str,
        fetcher: F,
        options: CacheOptions,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let now = Instant::now();

        if !options.force_refresh {
            if let Some(data) = self.get_live(key, now) {
                metrics::record_cache_lookup(true);
                tracing::trace!(key, "Cache hit");
                return Ok(data);
            }
        }

        metrics::record_cache_lookup(false);
        tracing::trace!(key, forced = options.force_refresh, "Cache miss");

        let data = fetcher().await?;
        self.inner.insert(
            key.to_string(),
            CacheEntry {
                data: data.clone(),
                expires_at: now + options.ttl,
            },
        );
        Ok(data)
    }

    fn get_live(&self, key: &str, now: Instant) -> Option<V> {
        self.inner
            .get(key)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.data.clone())
    }

    /// Unexpired value for `key`, without fetching.
    pub fn get(&self, key: &str) -> Option<V> {
        self.get_live(key, Instant::now())
    }

    /// Remove one key, or everything when `key` is `None`.
    pub fn clear(&self, key: Option<&str>) {
        match key {
            Some(key) => {
                self.inner.remove(key);
            }
            None => self.inner.clear(),
        }
    }

    /// Remove every key starting with `prefix`.
    pub fn clear_by_prefix(&self, prefix: &str) {
        self.inner.retain(|key, _| !key.starts_with(prefix));
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
