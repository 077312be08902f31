//! Process-local [`CacheStore`].

use async_trait::async_trait;
use biography_core::Result;
use biography_core::cache::CacheStore;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

struct Entry {
    value: String,
    expires_at: Instant,
}

/// TTL map guarded by a tokio `RwLock`. Expired entries are dropped on read.
#[derive(Default)]
pub struct InMemoryCacheStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl InMemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                None => return Ok(None),
                Some(entry) if entry.expires_at > now => return Ok(Some(entry.value.clone())),
                Some(_) => {}
            }
        }

        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(|entry| entry.expires_at <= now) {
            entries.remove(key);
            tracing::trace!("[InMemoryCacheStore] Evicted expired key {}", key);
        }
        Ok(None)
    }

    async fn put(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        let expires_at = Instant::now() + ttl;
        self.entries
            .write()
            .await
            .insert(key.to_string(), Entry { value, expires_at });
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_delete() {
        let cache = InMemoryCacheStore::new();
        cache
            .put("biography:slug:alice", "{}".to_string(), Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(
            cache.get("biography:slug:alice").await.unwrap().as_deref(),
            Some("{}")
        );

        cache.delete("biography:slug:alice").await.unwrap();
        assert!(cache.get("biography:slug:alice").await.unwrap().is_none());
        cache.delete("never-set").await.unwrap();
    }

    #[tokio::test]
    async fn test_zero_ttl_expires_immediately() {
        let cache = InMemoryCacheStore::new();
        cache.put("k", "v".to_string(), Duration::ZERO).await.unwrap();

        assert!(cache.get("k").await.unwrap().is_none());
        assert!(cache.entries.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_put_replaces_value_and_ttl() {
        let cache = InMemoryCacheStore::new();
        cache.put("k", "old".to_string(), Duration::ZERO).await.unwrap();
        cache.put("k", "new".to_string(), Duration::from_secs(60)).await.unwrap();

        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("new"));
        assert_eq!(cache.entries.read().await.len(), 1);
    }
}
