//! Bounded cache with per-entry TTL and least-recently-used eviction

use crate::types::CacheStats;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

/// A cached value with its insertion and access bookkeeping
struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
    last_accessed_at: Instant,
    /// Key of this entry's marker in the recency index
    touch: u64,
}

/// Entry map plus recency index. Both live behind one lock and are only
/// ever updated together, so partial updates are never observable.
struct CacheInner<V> {
    entries: HashMap<String, CacheEntry<V>>,
    /// Touch sequence -> key, least recently used first
    recency: BTreeMap<u64, String>,
    next_touch: u64,
}

/// An in-memory cache bounded by entry count.
///
/// Entries expire `ttl` after insertion, checked lazily on access; there
/// is no background sweep. Reads bump recency but never the TTL clock,
/// so a hot key still expires. When an insert would exceed `capacity`,
/// the least recently used entry is evicted first.
pub struct TtlLruCache<V> {
    inner: Mutex<CacheInner<V>>,
    capacity: usize,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    expirations: AtomicU64,
}

impl<V: Clone> TtlLruCache<V> {
    /// Create a new cache. `capacity` must be at least 1.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        assert!(capacity > 0, "cache capacity must be at least 1");
        Self {
            inner: Mutex::new(CacheInner {
                entries: HashMap::new(),
                recency: BTreeMap::new(),
                next_touch: 0,
            }),
            capacity,
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
            expirations: AtomicU64::new(0),
        }
    }

    /// Get a value, marking it most recently used.
    ///
    /// An entry older than the TTL is removed and reported as a miss.
    pub async fn get(&self, key: &str) -> Option<V> {
        let mut inner = self.inner.lock().await;
        let now = Instant::now();
        let CacheInner {
            entries,
            recency,
            next_touch,
        } = &mut *inner;

        let Some(entry) = entries.get_mut(key) else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            return None;
        };

        if now.duration_since(entry.inserted_at) >= self.ttl {
            recency.remove(&entry.touch);
            entries.remove(key);
            self.expirations.fetch_add(1, Ordering::Relaxed);
            self.misses.fetch_add(1, Ordering::Relaxed);
            debug!(key = %key, "cache entry expired");
            return None;
        }

        let touch = *next_touch;
        *next_touch += 1;
        recency.remove(&entry.touch);
        recency.insert(touch, key.to_string());
        entry.touch = touch;
        entry.last_accessed_at = now;

        self.hits.fetch_add(1, Ordering::Relaxed);
        Some(entry.value.clone())
    }

    /// Insert or replace a value, marking it most recently used.
    ///
    /// Replacement is total: the TTL clock restarts from this insertion,
    /// including for an expired-but-present entry. When the cache is at
    /// capacity, the least recently used entry is evicted first.
    pub async fn put(&self, key: &str, value: V) {
        let mut inner = self.inner.lock().await;
        let now = Instant::now();
        let CacheInner {
            entries,
            recency,
            next_touch,
        } = &mut *inner;

        let touch = *next_touch;
        *next_touch += 1;

        if let Some(entry) = entries.get_mut(key) {
            recency.remove(&entry.touch);
            recency.insert(touch, key.to_string());
            *entry = CacheEntry {
                value,
                inserted_at: now,
                last_accessed_at: now,
                touch,
            };
            return;
        }

        if entries.len() >= self.capacity {
            if let Some((_, lru_key)) = recency.pop_first() {
                if let Some(evicted) = entries.remove(&lru_key) {
                    self.evictions.fetch_add(1, Ordering::Relaxed);
                    debug!(
                        key = %lru_key,
                        idle_ms = evicted.last_accessed_at.elapsed().as_millis() as u64,
                        "evicted least recently used entry"
                    );
                }
            }
        }

        recency.insert(touch, key.to_string());
        entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                inserted_at: now,
                last_accessed_at: now,
                touch,
            },
        );
    }

    /// Number of entries currently cached, expired-but-unread included.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Snapshot of the cache's statistics.
    pub async fn stats(&self) -> CacheStats {
        let inner = self.inner.lock().await;
        CacheStats {
            entries: inner.entries.len(),
            capacity: self.capacity,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
        }
    }
}
