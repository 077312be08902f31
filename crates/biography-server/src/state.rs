use biography_application::{BadgeService, BiographyPorts, BiographyService, InteractionService};
use biography_core::clock::{Clock, SystemClock};
use biography_core::config::AppConfig;
use biography_core::event::EventPublisher;
use biography_infrastructure::{
    InMemoryCacheStore, SqliteBadgeRepository, SqliteBiographyRepository,
    SqliteContentRepository, SqliteInteractionRepository, SqliteOwnerDirectory,
    TracingEventPublisher, TracingMediaStore,
};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub biographies: Arc<BiographyService>,
    pub interactions: Arc<InteractionService>,
    pub badges: Arc<BadgeService>,
    /// Header carrying the authenticated viewer id.
    pub viewer_header: Arc<str>,
}

impl AppState {
    /// Wires every service over one SQLite pool and a process-local cache.
    pub fn sqlite(pool: SqlitePool, config: &AppConfig) -> Self {
        Self::sqlite_with_clock(pool, config, Arc::new(SystemClock))
    }

    pub fn sqlite_with_clock(pool: SqlitePool, config: &AppConfig, clock: Arc<dyn Clock>) -> Self {
        let biography_repo = Arc::new(SqliteBiographyRepository::new(pool.clone()));
        let events: Arc<dyn EventPublisher> = Arc::new(TracingEventPublisher);

        let ports = BiographyPorts {
            biographies: biography_repo.clone(),
            content: Arc::new(SqliteContentRepository::new(pool.clone())),
            owners: Arc::new(SqliteOwnerDirectory::new(pool.clone())),
            cache: Arc::new(InMemoryCacheStore::new()),
            events: events.clone(),
            media: Arc::new(TracingMediaStore),
            clock: clock.clone(),
        };

        Self {
            biographies: Arc::new(BiographyService::new(ports, config)),
            interactions: Arc::new(InteractionService::new(
                biography_repo,
                Arc::new(SqliteInteractionRepository::new(pool.clone())),
                events,
                clock.clone(),
            )),
            badges: Arc::new(BadgeService::new(
                Arc::new(SqliteBadgeRepository::new(pool)),
                clock,
            )),
            viewer_header: Arc::from(config.auth.viewer_header.to_ascii_lowercase()),
        }
    }
}
