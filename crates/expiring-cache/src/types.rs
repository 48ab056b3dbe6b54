//! Cache types

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A cached value with its absolute expiration instant
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    pub expires_at: DateTime<Utc>,
}

impl<V> CacheEntry<V> {
    /// An entry is live up to and including `expires_at`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// Statistics about the cache
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_entry_live_at_expiration_instant() {
        let now = Utc::now();
        let entry = CacheEntry {
            value: "v",
            expires_at: now,
        };

        assert!(!entry.is_expired(now));
        assert!(entry.is_expired(now + Duration::milliseconds(1)));
    }

    #[test]
    fn test_cache_stats_default() {
        let stats = CacheStats::default();
        assert_eq!(stats.entries, 0);
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
    }

    #[test]
    fn test_cache_stats_serialization() {
        let stats = CacheStats {
            entries: 3,
            hits: 10,
            misses: 2,
        };

        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("\"entries\":3"));
        assert!(json.contains("\"hits\":10"));
        assert!(json.contains("\"misses\":2"));
    }
}
