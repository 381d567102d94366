//! Read-mostly market data cache
//!
//! Short-lived, caller-owned cache keyed by instrument + kind + request
//! parameters (which include the time bucket). Safe to rebuild on a
//! cache-miss race: every writer computes the same deterministic value for
//! a given key.

use cached::{Cached, TimedCache};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use equirank_core::{InstrumentProfile, PriceSeries, StatementSnapshot};

/// Cache key for market data requests
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    /// Instrument identifier
    pub instrument: String,
    /// Request kind ("series", "statements", ...)
    pub kind: String,
    /// Request parameters as JSON string (lookback, cadence, time bucket)
    pub params: String,
}

impl CacheKey {
    /// Create a new cache key
    pub fn new(
        instrument: impl Into<String>,
        kind: impl Into<String>,
        params: impl Serialize,
    ) -> Self {
        Self {
            instrument: instrument.into(),
            kind: kind.into(),
            params: serde_json::to_string(&params).unwrap_or_default(),
        }
    }
}

/// Thread-safe timed cache for one payload type
pub struct MarketCache<V: Clone> {
    cache: Arc<RwLock<TimedCache<CacheKey, V>>>,
}

impl<V: Clone> MarketCache<V> {
    /// Create a new cache with the given TTL
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Arc::new(RwLock::new(TimedCache::with_lifespan(ttl))),
        }
    }

    /// Get a value from the cache
    pub async fn get(&self, key: &CacheKey) -> Option<V> {
        let mut cache = self.cache.write().await;
        cache.cache_get(key).cloned()
    }

    /// Insert a value into the cache
    pub async fn insert(&self, key: CacheKey, value: V) {
        let mut cache = self.cache.write().await;
        let _ = cache.cache_set(key, value);
    }

    /// Get or fetch a value using the provided fetcher function
    ///
    /// On a miss the fetcher runs outside the lock, so two racing callers
    /// may both fetch; they store the same deterministic value.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: CacheKey, fetcher: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(&key).await {
            tracing::debug!(?key, "cache hit");
            return Ok(value);
        }
        tracing::debug!(?key, "cache miss");

        let value = fetcher().await?;
        self.insert(key, value.clone()).await;
        Ok(value)
    }

    /// Number of cached entries
    pub async fn len(&self) -> usize {
        let cache = self.cache.read().await;
        cache.cache_size()
    }

    /// Check if the cache is empty
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl<V: Clone> Clone for MarketCache<V> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
        }
    }
}

/// Caches for the different market data kinds
///
/// Price history moves fast; statements and profiles barely move. Each gets
/// its own TTL.
pub struct MarketCaches {
    pub series: MarketCache<PriceSeries>,
    pub statements: MarketCache<Vec<StatementSnapshot>>,
    pub profiles: MarketCache<InstrumentProfile>,
}

impl MarketCaches {
    /// Create caches with the given realtime and fundamental TTLs
    pub fn new(realtime_ttl: Duration, fundamental_ttl: Duration) -> Self {
        Self {
            series: MarketCache::new(realtime_ttl),
            statements: MarketCache::new(fundamental_ttl),
            profiles: MarketCache::new(fundamental_ttl),
        }
    }
}
