pub mod config_service;
pub mod database;
mod error;
pub mod memory_cache_store;
pub mod paths;
mod predicate;
pub mod sqlite_badge_repository;
pub mod sqlite_biography_repository;
pub mod sqlite_content_repository;
pub mod sqlite_interaction_repository;
pub mod sqlite_owner_directory;
pub mod tracing_event_publisher;
pub mod tracing_media_store;

#[cfg(test)]
mod test_support;

pub use crate::config_service::ConfigService;
pub use crate::database::{connect, connect_in_memory};
pub use crate::memory_cache_store::InMemoryCacheStore;
pub use crate::paths::BiographyPaths;
pub use crate::sqlite_badge_repository::SqliteBadgeRepository;
pub use crate::sqlite_biography_repository::SqliteBiographyRepository;
pub use crate::sqlite_content_repository::SqliteContentRepository;
pub use crate::sqlite_interaction_repository::SqliteInteractionRepository;
pub use crate::sqlite_owner_directory::SqliteOwnerDirectory;
pub use crate::tracing_event_publisher::TracingEventPublisher;
pub use crate::tracing_media_store::TracingMediaStore;
