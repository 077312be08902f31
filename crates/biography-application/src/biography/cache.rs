use biography_core::biography::Biography;
use biography_core::cache::CacheStore;
use biography_core::config::CacheConfig;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

/// Read-through cache for detail pages and featured lists.
///
/// Every failure is logged and treated as a miss; the store stays the source
/// of truth. Only `public` records are written to the detail cache, and a
/// cached detail entry whose visibility is not `public` is never served.
#[derive(Clone)]
pub struct BiographyCache {
    store: Arc<dyn CacheStore>,
    detail_ttl: Duration,
    featured_ttl: Duration,
    featured_limits: Vec<u32>,
}

impl BiographyCache {
    pub fn new(store: Arc<dyn CacheStore>, config: &CacheConfig) -> Self {
        Self {
            store,
            detail_ttl: config.detail_ttl(),
            featured_ttl: config.featured_ttl(),
            featured_limits: config.featured_limits.clone(),
        }
    }

    pub fn detail_key(slug: &str) -> String {
        format!("biography:slug:{slug}")
    }

    pub fn featured_key(limit: u32) -> String {
        format!("biographies:featured:{limit}")
    }

    /// Returns true when featured lists of this size are cached.
    pub fn caches_featured(&self, limit: u32) -> bool {
        self.featured_limits.contains(&limit)
    }

    pub async fn detail(&self, slug: &str) -> Option<Biography> {
        let cached: Biography = self.read(&Self::detail_key(slug)).await?;
        if !cached.is_public() {
            tracing::warn!(
                slug = %slug,
                "[BiographyCache] Ignoring cached entry with visibility '{}'",
                cached.visibility
            );
            return None;
        }
        Some(cached)
    }

    pub async fn store_detail(&self, biography: &Biography) {
        if !biography.is_public() {
            return;
        }
        self.write(&Self::detail_key(&biography.slug), biography, self.detail_ttl)
            .await;
    }

    pub async fn featured(&self, limit: u32) -> Option<Vec<Biography>> {
        if !self.caches_featured(limit) {
            return None;
        }
        self.read(&Self::featured_key(limit)).await
    }

    pub async fn store_featured(&self, limit: u32, biographies: &[Biography]) {
        if !self.caches_featured(limit) {
            return;
        }
        self.write(&Self::featured_key(limit), biographies, self.featured_ttl)
            .await;
    }

    /// Drops the detail entry for `slug` and every featured list variant.
    pub async fn invalidate(&self, slug: &str) {
        let keys = std::iter::once(Self::detail_key(slug))
            .chain(self.featured_limits.iter().map(|l| Self::featured_key(*l)));
        for key in keys {
            if let Err(e) = self.store.delete(&key).await {
                tracing::warn!("[BiographyCache] Failed to delete {}: {}", key, e);
            }
        }
        tracing::debug!(slug = %slug, "[BiographyCache] Invalidated");
    }

    async fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key).await {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!("[BiographyCache] Failed to read {}: {}", key, e);
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("[BiographyCache] Discarding undecodable {}: {}", key, e);
                None
            }
        }
    }

    async fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Duration) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("[BiographyCache] Failed to encode {}: {}", key, e);
                return;
            }
        };
        if let Err(e) = self.store.put(key, raw, ttl).await {
            tracing::warn!("[BiographyCache] Failed to write {}: {}", key, e);
        }
    }
}
