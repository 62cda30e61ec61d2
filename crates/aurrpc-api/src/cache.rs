//! Search result cache keyed by a canonical query fingerprint.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};

use log::trace;

use crate::models::RpcResult;

#[derive(Debug, Clone)]
struct CacheEntry {
    result: RpcResult,
    inserted_at: Instant,
}

/// TTL-evicted cache of computed search results.
///
/// Entries live until the periodic eviction pass removes them; lookups do
/// not check age themselves.
#[derive(Debug)]
pub struct SearchCache {
    enabled: bool,
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl SearchCache {
    /// A cache whose entries expire after `ttl`. A disabled cache ignores
    /// inserts and always misses.
    #[must_use]
    pub fn new(enabled: bool, ttl: Duration) -> Self {
        Self {
            enabled,
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Look up a previously computed result.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<RpcResult> {
        if !self.enabled {
            return None;
        }
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(key).map(|entry| entry.result.clone())
    }

    /// Store a computed result under its fingerprint.
    pub fn put(&self, key: String, result: RpcResult) {
        if !self.enabled {
            return;
        }
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(
            key,
            CacheEntry {
                result,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Drop every entry older than the TTL.
    pub fn cleanup(&self) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.retain(|key, entry| {
            let keep = entry.inserted_at.elapsed() <= self.ttl;
            if !keep {
                trace!("removed cache entry for {key}");
            }
            keep
        });
    }

    /// Drop all entries; returns how many were removed.
    pub fn wipe(&self) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let removed = entries.len();
        entries.clear();
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_then_get_roundtrips() {
        let cache = SearchCache::new(true, Duration::from_secs(60));
        cache.put("k".to_owned(), RpcResult::empty("search"));
        let hit = cache.get("k").unwrap();
        assert_eq!(hit.kind, "search");
        assert!(cache.get("other").is_none());
    }

    #[test]
    fn disabled_cache_never_hits() {
        let cache = SearchCache::new(false, Duration::from_secs(60));
        cache.put("k".to_owned(), RpcResult::empty("search"));
        assert!(cache.get("k").is_none());
        assert_eq!(cache.wipe(), 0);
    }

    #[test]
    fn cleanup_honors_ttl() {
        let cache = SearchCache::new(true, Duration::ZERO);
        cache.put("k".to_owned(), RpcResult::empty("search"));
        std::thread::sleep(Duration::from_millis(5));
        cache.cleanup();
        assert!(cache.get("k").is_none());

        let fresh = SearchCache::new(true, Duration::from_secs(3600));
        fresh.put("k".to_owned(), RpcResult::empty("search"));
        fresh.cleanup();
        assert!(fresh.get("k").is_some());
    }

    #[test]
    fn wipe_reports_removed_count() {
        let cache = SearchCache::new(true, Duration::from_secs(60));
        cache.put("a".to_owned(), RpcResult::empty("search"));
        cache.put("b".to_owned(), RpcResult::empty("search"));
        assert_eq!(cache.wipe(), 2);
    }
}
