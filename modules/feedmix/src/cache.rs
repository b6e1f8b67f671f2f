// Cache collaborator boundary.
//
// Providers consult the cache before any network I/O and overwrite the
// entry after every successful fetch. Expiry is the backend's job; the
// in-process MemoryCache enforces its TTLs on read.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::Value;

/// External cache backend interface. Implementations must be safe for
/// concurrent `contains`/`fetch`/`save` from multiple provider instances.
#[async_trait]
pub trait FeedCache: Send + Sync {
    async fn contains(&self, key: &str) -> bool;

    /// Read a previously saved value. A backend may evict an entry between
    /// `contains` and `fetch`; returning `None` degrades to a refetch.
    async fn fetch(&self, key: &str) -> Option<Value>;

    async fn save(&self, key: &str, value: Value, ttl_seconds: u64);
}

/// In-process cache backend.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, (Value, Instant)>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FeedCache for MemoryCache {
    async fn contains(&self, key: &str) -> bool {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some((_, expires_at)) if *expires_at > Instant::now() => true,
            Some(_) => {
                entries.remove(key);
                false
            }
            None => false,
        }
    }

    async fn fetch(&self, key: &str) -> Option<Value> {
        let entries = self.entries.lock().unwrap();
        entries
            .get(key)
            .filter(|(_, expires_at)| *expires_at > Instant::now())
            .map(|(value, _)| value.clone())
    }

    async fn save(&self, key: &str, value: Value, ttl_seconds: u64) {
        let expires_at = Instant::now() + Duration::from_secs(ttl_seconds);
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), (value, expires_at));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn save_then_contains_and_fetch() {
        let cache = MemoryCache::new();
        cache.save("k", json!({"items": []}), 60).await;

        assert!(cache.contains("k").await);
        assert_eq!(cache.fetch("k").await, Some(json!({"items": []})));
    }

    #[tokio::test]
    async fn missing_key_is_absent() {
        let cache = MemoryCache::new();
        assert!(!cache.contains("nope").await);
        assert_eq!(cache.fetch("nope").await, None);
    }

    #[tokio::test]
    async fn zero_ttl_expires_immediately() {
        let cache = MemoryCache::new();
        cache.save("k", json!(1), 0).await;

        assert!(!cache.contains("k").await);
        assert_eq!(cache.fetch("k").await, None);
    }

    #[tokio::test]
    async fn save_overwrites_existing_entry() {
        let cache = MemoryCache::new();
        cache.save("k", json!(1), 60).await;
        cache.save("k", json!(2), 60).await;

        assert_eq!(cache.fetch("k").await, Some(json!(2)));
    }
}
