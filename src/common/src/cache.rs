//! Time-boxed response cache keyed by endpoint path.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

struct CacheEntry {
    body: Arc<str>,
    fetched_at: Instant,
}

/// In-memory cache of raw response bodies.
///
/// An entry is served while it is younger than the TTL; stale entries are
/// left in place until overwritten or cleared.
pub struct ResponseCache {
    ttl: Duration,
    entries: HashMap<String, CacheEntry>,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh body for `endpoint`, if any.
    pub fn get(&self, endpoint: &str) -> Option<Arc<str>> {
        self.entries
            .get(endpoint)
            .filter(|entry| entry.fetched_at.elapsed() < self.ttl)
            .map(|entry| Arc::clone(&entry.body))
    }

    pub fn insert(&mut self, endpoint: &str, body: Arc<str>) {
        self.entries.insert(
            endpoint.to_string(),
            CacheEntry {
                body,
                fetched_at: Instant::now(),
            },
        );
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cached endpoint keys, sorted.
    pub fn endpoints(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_entry_served_within_ttl() {
        let mut cache = ResponseCache::new(Duration::from_secs(300));
        cache.insert("/fixtures/", Arc::from("[]"));

        tokio::time::advance(Duration::from_secs(299)).await;

        assert_eq!(cache.get("/fixtures/").as_deref(), Some("[]"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_after_ttl() {
        let mut cache = ResponseCache::new(Duration::from_secs(300));
        cache.insert("/fixtures/", Arc::from("[]"));

        tokio::time::advance(Duration::from_secs(300)).await;

        assert!(cache.get("/fixtures/").is_none());
        // Stale entries still count until cleared
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_insert_refreshes_timestamp() {
        let mut cache = ResponseCache::new(Duration::from_secs(10));
        cache.insert("/bootstrap-static/", Arc::from("old"));
        tokio::time::advance(Duration::from_secs(8)).await;
        cache.insert("/bootstrap-static/", Arc::from("new"));
        tokio::time::advance(Duration::from_secs(8)).await;

        assert_eq!(cache.get("/bootstrap-static/").as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn test_clear_and_endpoints() {
        let mut cache = ResponseCache::new(Duration::from_secs(300));
        assert!(cache.is_empty());

        cache.insert("/fixtures/", Arc::from("[]"));
        cache.insert("/bootstrap-static/", Arc::from("{}"));
        assert_eq!(cache.endpoints(), vec!["/bootstrap-static/", "/fixtures/"]);

        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.get("/fixtures/").is_none());
    }
}
