use moka::future::Cache;
use moka::notification::RemovalCause;
use moka::Expiry;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::models::{normalize_dietary, SearchQuery};

/// Default time-to-live of a cached search result
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// A stored payload and the moment it stops being served
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub key: String,
    pub payload: V,
    pub expires_at: Instant,
    ttl: Duration,
}

impl<V> CacheEntry<V> {
    fn new(key: String, payload: V, ttl: Duration) -> Self {
        Self {
            key,
            payload,
            expires_at: Instant::now() + ttl,
            ttl,
        }
    }

    #[inline]
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now > self.expires_at
    }
}

/// Per-entry expiry so moka reclaims entries nobody reads again
struct EntryExpiry;

impl<V> Expiry<String, CacheEntry<V>> for EntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CacheEntry<V>,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CacheEntry<V>,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Time-bounded memoization of search results
///
/// Reads evict expired entries lazily. On top of that moka enforces a
/// capacity bound and drops expired entries during housekeeping, and
/// [`ResultCache::purge_expired`] can be run periodically as an active sweep.
/// Operations on different keys never block each other.
#[derive(Clone)]
pub struct ResultCache<V> {
    entries: Cache<String, CacheEntry<V>>,
    default_ttl: Duration,
    expired: Arc<AtomicU64>,
}

impl<V> ResultCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Create a cache holding at most `max_entries` results
    pub fn new(max_entries: u64, default_ttl: Duration) -> Self {
        let expired = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&expired);

        let entries = Cache::builder()
            .max_capacity(max_entries)
            .expire_after(EntryExpiry)
            .eviction_listener(move |_key, _entry, cause| {
                if cause == RemovalCause::Expired {
                    counter.fetch_add(1, Ordering::Relaxed);
                }
            })
            .build();

        Self {
            entries,
            default_ttl,
            expired,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Return the payload if it has not expired; expired entries are evicted
    pub async fn get(&self, key: &str) -> Option<V> {
        let entry = self.entries.get(key).await?;

        if entry.is_expired_at(Instant::now()) {
            self.entries.invalidate(key).await;
            tracing::trace!("Cache entry expired: {}", entry.key);
            return None;
        }

        tracing::trace!("Cache hit: {}", entry.key);
        Some(entry.payload)
    }

    /// Store a payload that expires `ttl` from now
    pub async fn set(&self, key: &str, payload: V, ttl: Duration) {
        self.entries
            .insert(key.to_string(), CacheEntry::new(key.to_string(), payload, ttl))
            .await;
        tracing::trace!("Cache set: {} (ttl {:?})", key, ttl);
    }

    /// Return the cached payload, or run `init` and store its result
    ///
    /// Concurrent callers for the same key share a single `init` run. The
    /// boolean is true when this call produced the value. Errors are not
    /// cached.
    pub async fn get_or_try_insert_with<F, E>(
        &self,
        key: &str,
        ttl: Duration,
        init: F,
    ) -> Result<(V, bool), Arc<E>>
    where
        F: Future<Output = Result<V, E>>,
        E: Send + Sync + 'static,
    {
        let owned_key = key.to_string();
        let entry = self
            .entries
            .entry(owned_key.clone())
            .or_try_insert_with(async move {
                init.await
                    .map(|payload| CacheEntry::new(owned_key, payload, ttl))
            })
            .await?;

        let fresh = entry.is_fresh();
        Ok((entry.into_value().payload, fresh))
    }

    pub async fn invalidate(&self, key: &str) {
        self.entries.invalidate(key).await;
    }

    /// Run moka housekeeping and return how many entries it expired
    ///
    /// Expiry is tracked on a timer wheel with roughly one second
    /// granularity, so an entry is only reclaimed here about a second after
    /// its deadline. Reads never see it in the meantime.
    pub async fn purge_expired(&self) -> u64 {
        let before = self.expired.load(Ordering::Relaxed);
        self.entries.run_pending_tasks().await;
        let purged = self.expired.load(Ordering::Relaxed).saturating_sub(before);

        if purged > 0 {
            tracing::debug!("Purged {} expired cache entries", purged);
        }
        purged
    }

    pub fn entry_count(&self) -> u64 {
        self.entries.entry_count()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.entry_count(),
            expired_total: self.expired.load(Ordering::Relaxed),
            default_ttl_secs: self.default_ttl.as_secs(),
        }
    }
}

/// Run [`ResultCache::purge_expired`] every `interval` until the runtime stops
pub fn spawn_cache_sweeper<V>(cache: ResultCache<V>, interval: Duration) -> tokio::task::JoinHandle<()>
where
    V: Clone + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            cache.purge_expired().await;
        }
    })
}

/// Cache statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub entries: u64,
    pub expired_total: u64,
    pub default_ttl_secs: u64,
}

/// Build the cache key of a search
///
/// Location is trimmed, lowercased and whitespace-collapsed; dietary tags are
/// normalized and sorted, so equal queries always map to the same key.
pub fn cache_key(query: &SearchQuery) -> String {
    let location = query
        .location
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    let budget = query.budget.map_or("any", |b| b.as_str());
    let dietary = normalize_dietary(&query.dietary)
        .into_iter()
        .collect::<Vec<_>>()
        .join(",");

    // adding 0.0 folds -0.0 into 0.0
    let min_rating = query.min_rating + 0.0;

    format!(
        "search:{}:{}:{}:{}:{}",
        location, budget, dietary, min_rating, query.radius_m
    )
}
