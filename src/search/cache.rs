//! Query result cache.
//!
//! An LRU + TTL hybrid keyed by `(query, page, page_size)`. Entries expire
//! lazily on read; when an insert of a new key finds the cache full, the
//! single least-recently-used key is evicted first. Every hit or insert
//! moves its key to the most-recently-used end of the access order.

use std::time::{Duration, Instant};

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::search::results::SearchResults;

/// Cache configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Whether the query processor consults the cache at all.
    pub enabled: bool,

    /// Maximum number of cached pages.
    pub max_size: usize,

    /// Entry time-to-live in seconds.
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            enabled: true,
            max_size: 1000,
            ttl_secs: 300,
        }
    }
}

/// The deterministic cache key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct CacheKey {
    query: String,
    page: usize,
    page_size: usize,
}

#[derive(Debug)]
struct CacheEntry {
    data: SearchResults,
    expires_at: Instant,
}

/// Cumulative cache counters.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub size: usize,
    pub max_size: usize,
}

impl CacheStats {
    /// Hits divided by total lookups; 0 before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// LRU + TTL cache of complete result pages.
#[derive(Debug)]
pub struct QueryCache {
    entries: AHashMap<CacheKey, CacheEntry>,
    /// Access order, least recently used first.
    order: Vec<CacheKey>,
    max_size: usize,
    ttl: Duration,
    hits: u64,
    misses: u64,
}

impl QueryCache {
    /// Create a cache from its configuration.
    pub fn new(config: &CacheConfig) -> Self {
        QueryCache {
            entries: AHashMap::with_capacity(config.max_size),
            order: Vec::with_capacity(config.max_size),
            max_size: config.max_size.max(1),
            ttl: Duration::from_secs(config.ttl_secs),
            hits: 0,
            misses: 0,
        }
    }

    /// Look up a cached page. Expired entries are removed on access and
    /// count as misses.
    pub fn get(&mut self, query: &str, page: usize, page_size: usize) -> Option<SearchResults> {
        self.get_at(query, page, page_size, Instant::now())
    }

    /// Insert or overwrite a page.
    pub fn set(&mut self, query: &str, page: usize, page_size: usize, data: SearchResults) {
        self.set_at(query, page, page_size, data, Instant::now())
    }

    fn get_at(
        &mut self,
        query: &str,
        page: usize,
        page_size: usize,
        now: Instant,
    ) -> Option<SearchResults> {
        let key = CacheKey {
            query: query.to_string(),
            page,
            page_size,
        };

        let expired = match self.entries.get(&key) {
            Some(entry) => entry.expires_at <= now,
            None => {
                self.misses += 1;
                return None;
            }
        };

        if expired {
            self.entries.remove(&key);
            self.order.retain(|k| k != &key);
            self.misses += 1;
            return None;
        }

        self.hits += 1;
        self.touch(&key);
        Some(self.entries[&key].data.clone())
    }

    fn set_at(
        &mut self,
        query: &str,
        page: usize,
        page_size: usize,
        data: SearchResults,
        now: Instant,
    ) {
        let key = CacheKey {
            query: query.to_string(),
            page,
            page_size,
        };
        let entry = CacheEntry {
            data,
            expires_at: now + self.ttl,
        };

        if self.entries.contains_key(&key) {
            self.entries.insert(key.clone(), entry);
            self.touch(&key);
            return;
        }

        if self.entries.len() >= self.max_size && !self.order.is_empty() {
            let evicted = self.order.remove(0);
            self.entries.remove(&evicted);
        }

        self.entries.insert(key.clone(), entry);
        self.order.push(key);
    }

    /// Clear the entire cache. Pattern-based invalidation is deliberately
    /// coarse for the in-memory implementation; a distributed backing store
    /// could refine it without changing this contract.
    pub fn invalidate(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    /// Get cumulative counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            size: self.entries.len(),
            max_size: self.max_size,
        }
    }

    fn touch(&mut self, key: &CacheKey) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            let key = self.order.remove(pos);
            self.order.push(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(marker: &str) -> SearchResults {
        SearchResults {
            results: Vec::new(),
            total_count: 0,
            page: 1,
            page_size: 10,
            query_time_ms: 0,
            query: marker.to_string(),
        }
    }

    fn cache(max_size: usize) -> QueryCache {
        QueryCache::new(&CacheConfig {
            enabled: true,
            max_size,
            ttl_secs: 60,
        })
    }

    #[test]
    fn test_set_then_get() {
        let mut cache = cache(10);
        cache.set("rust", 1, 10, page("a"));

        let hit = cache.get("rust", 1, 10).unwrap();
        assert_eq!(hit.query, "a");

        // Different page size is a different key.
        assert!(cache.get("rust", 1, 20).is_none());
    }

    #[test]
    fn test_lru_eviction_order() {
        let mut cache = cache(2);
        cache.set("a", 1, 10, page("a"));
        cache.set("b", 1, 10, page("b"));

        // Touch "a" so "b" becomes the LRU entry.
        cache.get("a", 1, 10).unwrap();
        cache.set("c", 1, 10, page("c"));

        assert!(cache.get("a", 1, 10).is_some());
        assert!(cache.get("b", 1, 10).is_none());
        assert!(cache.get("c", 1, 10).is_some());
    }

    #[test]
    fn test_overwrite_does_not_evict() {
        let mut cache = cache(2);
        cache.set("a", 1, 10, page("a"));
        cache.set("b", 1, 10, page("b"));
        cache.set("a", 1, 10, page("a2"));

        assert_eq!(cache.stats().size, 2);
        assert_eq!(cache.get("a", 1, 10).unwrap().query, "a2");
        assert!(cache.get("b", 1, 10).is_some());
    }

    #[test]
    fn test_ttl_expiry_on_access() {
        let mut cache = cache(10);
        let start = Instant::now();
        cache.set_at("rust", 1, 10, page("a"), start);

        let later = start + Duration::from_secs(61);
        assert!(cache.get_at("rust", 1, 10, later).is_none());
        assert_eq!(cache.stats().size, 0);
    }

    #[test]
    fn test_hit_rate() {
        let mut cache = cache(10);
        assert_eq!(cache.stats().hit_rate(), 0.0);

        cache.set("rust", 1, 10, page("a"));
        cache.get("rust", 1, 10);
        cache.get("ghost", 1, 10);

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert!((stats.hit_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_invalidate_clears_everything() {
        let mut cache = cache(10);
        cache.set("a", 1, 10, page("a"));
        cache.set("b", 1, 10, page("b"));

        cache.invalidate();

        assert_eq!(cache.stats().size, 0);
        assert!(cache.get("a", 1, 10).is_none());
    }
}
