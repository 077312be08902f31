//! Service wiring over an in-memory SQLite database.

use crate::{BadgeService, BiographyPorts, BiographyService, InteractionService};
use async_trait::async_trait;
use biography_core::biography::OwnerProfile;
use biography_core::cache::CacheStore;
use biography_core::clock::ManualClock;
use biography_core::config::AppConfig;
use biography_core::event::{BiographyEvent, EventPublisher};
use biography_core::media::MediaStore;
use biography_core::{BiographyError, Result};
use biography_infrastructure::{
    InMemoryCacheStore, SqliteBadgeRepository, SqliteBiographyRepository,
    SqliteContentRepository, SqliteInteractionRepository, SqliteOwnerDirectory,
    connect_in_memory,
};
use chrono::{DateTime, TimeZone, Utc};
use sqlx::SqlitePool;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub(crate) fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
}

#[derive(Default)]
pub(crate) struct RecordingPublisher {
    events: Mutex<Vec<BiographyEvent>>,
}

impl RecordingPublisher {
    pub(crate) fn events(&self) -> Vec<BiographyEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, event: BiographyEvent) -> Result<()> {
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct RecordingMedia {
    released: Mutex<Vec<String>>,
}

impl RecordingMedia {
    pub(crate) fn released(&self) -> Vec<String> {
        self.released.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaStore for RecordingMedia {
    async fn release(&self, url: &str) -> Result<()> {
        self.released.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

/// A cache whose every call fails.
pub(crate) struct BrokenCache;

#[async_trait]
impl CacheStore for BrokenCache {
    async fn get(&self, _key: &str) -> Result<Option<String>> {
        Err(BiographyError::cache("connection refused"))
    }

    async fn put(&self, _key: &str, _value: String, _ttl: Duration) -> Result<()> {
        Err(BiographyError::cache("connection refused"))
    }

    async fn delete(&self, _key: &str) -> Result<()> {
        Err(BiographyError::cache("connection refused"))
    }
}

pub(crate) struct Harness {
    pub pool: SqlitePool,
    pub clock: Arc<ManualClock>,
    pub cache: Arc<InMemoryCacheStore>,
    pub events: Arc<RecordingPublisher>,
    pub media: Arc<RecordingMedia>,
    pub biographies: BiographyService,
    pub interactions: InteractionService,
    pub badges: BadgeService,
}

impl Harness {
    pub(crate) async fn new() -> Self {
        Self::with_cache(None).await
    }

    /// Wires the services, optionally over a replacement cache store.
    pub(crate) async fn with_cache(cache_override: Option<Arc<dyn CacheStore>>) -> Self {
        let pool = connect_in_memory().await.unwrap();
        let clock = Arc::new(ManualClock::new(t0()));
        let cache = Arc::new(InMemoryCacheStore::new());
        let events = Arc::new(RecordingPublisher::default());
        let media = Arc::new(RecordingMedia::default());
        let repo = Arc::new(SqliteBiographyRepository::new(pool.clone()));

        let ports = BiographyPorts {
            biographies: repo.clone(),
            content: Arc::new(SqliteContentRepository::new(pool.clone())),
            owners: Arc::new(SqliteOwnerDirectory::new(pool.clone())),
            cache: cache_override.unwrap_or_else(|| cache.clone()),
            events: events.clone(),
            media: media.clone(),
            clock: clock.clone(),
        };
        let biographies = BiographyService::new(ports, &AppConfig::default());
        let interactions = InteractionService::new(
            repo,
            Arc::new(SqliteInteractionRepository::new(pool.clone())),
            events.clone(),
            clock.clone(),
        );
        let badges = BadgeService::new(
            Arc::new(SqliteBadgeRepository::new(pool.clone())),
            clock.clone(),
        );

        Self {
            pool,
            clock,
            cache,
            events,
            media,
            biographies,
            interactions,
            badges,
        }
    }

    pub(crate) async fn add_user(&self, id: &str, username: &str, display_name: Option<&str>) {
        SqliteOwnerDirectory::new(self.pool.clone())
            .upsert_profile(&OwnerProfile {
                id: id.to_string(),
                username: username.to_string(),
                display_name: display_name.map(str::to_string),
                avatar_url: Some(format!("https://img.example/{id}.png")),
            })
            .await
            .unwrap();
    }
}
