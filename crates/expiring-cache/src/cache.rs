//! Concurrent expiring cache with in-memory storage and background sweeping

use crate::types::{CacheEntry, CacheStats};
use chrono::{Duration as ChronoDuration, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

/// Default interval between physical sweeps of expired entries, independent
/// of the per-entry TTL.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// A process-wide expiring cache, shared by cloning the handle.
///
/// Every insert stamps the entry with `now + ttl`; reads return `None` for
/// absent or expired keys. Lookups take only the shared lock, so readers
/// never block other readers. Expired entries linger until the next sweep
/// (or overwrite) but are never observable through [`ExpiringCache::get`].
pub struct ExpiringCache<V> {
    inner: Arc<Inner<V>>,
}

impl<V> Clone for ExpiringCache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<V> {
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
    ttl: ChronoDuration,
    sweeper_started: AtomicBool,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<V> Inner<V> {
    /// Single-pass physical deletion of expired entries.
    async fn remove_expired(&self) -> usize {
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }
}

impl<V: Clone + Send + Sync + 'static> ExpiringCache<V> {
    /// Create a cache applying `ttl` to every future insert.
    pub fn new(ttl: Duration) -> Self {
        let ttl = ChronoDuration::from_std(ttl).expect("cache TTL out of range");
        Self {
            inner: Arc::new(Inner {
                entries: RwLock::new(HashMap::new()),
                ttl,
                sweeper_started: AtomicBool::new(false),
                hits: AtomicU64::new(0),
                misses: AtomicU64::new(0),
            }),
        }
    }

    /// Look up a live entry. Absent and expired keys are both misses;
    /// expired entries are left for the sweeper rather than removed here.
    pub async fn get(&self, key: &str) -> Option<V> {
        let entries = self.inner.entries.read().await;
        match entries.get(key) {
            Some(entry) if !entry.is_expired(Utc::now()) => {
                self.inner.hits.fetch_add(1, Ordering::Relaxed);
                Some(entry.value.clone())
            }
            _ => {
                self.inner.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Insert or replace an entry wholesale, stamping `now + ttl`.
    /// Last writer wins.
    pub async fn insert(&self, key: impl Into<String>, value: V) {
        let entry = CacheEntry {
            value,
            expires_at: Utc::now() + self.inner.ttl,
        };
        let mut entries = self.inner.entries.write().await;
        entries.insert(key.into(), entry);
    }

    /// Physically delete every expired entry, returning how many were
    /// removed. Memory bounding only; `get` never depends on this running.
    pub async fn remove_expired(&self) -> usize {
        self.inner.remove_expired().await
    }

    /// Start the background sweep task, once per cache. Returns `false` if a
    /// sweeper is already running. The task holds only a weak reference and
    /// exits when the last cache handle is dropped.
    pub fn spawn_sweeper(&self, period: Duration) -> bool {
        if self.inner.sweeper_started.swap(true, Ordering::SeqCst) {
            return false;
        }

        let weak: Weak<Inner<V>> = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // the first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(inner) = weak.upgrade() else { break };
                let removed = inner.remove_expired().await;
                if removed > 0 {
                    debug!(removed, "removed expired cache entries");
                }
            }
        });
        true
    }

    /// Number of entries physically present, live or not.
    pub async fn len(&self) -> usize {
        self.inner.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Current cache statistics
    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.inner.entries.read().await.len(),
            hits: self.inner.hits.load(Ordering::Relaxed),
            misses: self.inner.misses.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_and_get() {
        let cache: ExpiringCache<String> = ExpiringCache::new(Duration::from_secs(60));

        cache.insert("file:abc", "resolved".to_string()).await;

        assert_eq!(cache.get("file:abc").await.as_deref(), Some("resolved"));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_get_missing_key() {
        let cache: ExpiringCache<String> = ExpiringCache::new(Duration::from_secs(60));

        assert!(cache.get("file:absent").await.is_none());
    }

    #[tokio::test]
    async fn test_repeated_reads_return_same_value() {
        let cache: ExpiringCache<String> = ExpiringCache::new(Duration::from_secs(60));
        cache.insert("k", "v".to_string()).await;

        let first = cache.get("k").await;
        let second = cache.get("k").await;

        assert_eq!(first, second);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_expired_entry_is_a_miss_without_sweep() {
        let cache: ExpiringCache<String> = ExpiringCache::new(Duration::from_millis(50));
        cache.insert("k", "v".to_string()).await;

        tokio::time::sleep(Duration::from_millis(150)).await;

        // miss even though the entry is still physically present
        assert!(cache.get("k").await.is_none());
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_remove_expired() {
        let cache: ExpiringCache<String> = ExpiringCache::new(Duration::from_millis(50));
        cache.insert("stale", "v".to_string()).await;

        tokio::time::sleep(Duration::from_millis(150)).await;
        cache.insert("fresh", "v".to_string()).await;

        assert_eq!(cache.remove_expired().await, 1);
        assert_eq!(cache.len().await, 1);
        assert!(cache.get("fresh").await.is_some());
    }

    #[tokio::test]
    async fn test_insert_replaces_and_restamps_expiration() {
        let cache: ExpiringCache<String> = ExpiringCache::new(Duration::from_millis(300));
        cache.insert("k", "old".to_string()).await;

        tokio::time::sleep(Duration::from_millis(200)).await;
        cache.insert("k", "new".to_string()).await;

        // past the first entry's deadline, within the second's
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(cache.get("k").await.as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn test_reads_do_not_refresh_expiration() {
        let cache: ExpiringCache<String> = ExpiringCache::new(Duration::from_millis(200));
        cache.insert("k", "v".to_string()).await;

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(cache.get("k").await.is_some());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(cache.get("k").await.is_none());
    }

    #[tokio::test]
    async fn test_hit_miss_counters() {
        let cache: ExpiringCache<String> = ExpiringCache::new(Duration::from_secs(60));

        cache.get("k").await;
        cache.insert("k", "v".to_string()).await;
        cache.get("k").await;

        let stats = cache.stats().await;
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[tokio::test]
    async fn test_sweeper_removes_expired_entries() {
        let cache: ExpiringCache<String> = ExpiringCache::new(Duration::from_millis(20));
        cache.insert("k", "v".to_string()).await;

        assert!(cache.spawn_sweeper(Duration::from_millis(25)));

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn test_sweeper_starts_exactly_once() {
        let cache: ExpiringCache<String> = ExpiringCache::new(Duration::from_secs(60));

        assert!(cache.spawn_sweeper(Duration::from_secs(60)));
        assert!(!cache.spawn_sweeper(Duration::from_secs(60)));
        assert!(!cache.clone().spawn_sweeper(Duration::from_secs(60)));
    }
}
