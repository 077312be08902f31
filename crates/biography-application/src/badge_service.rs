//! Badge progress and unlock recording.

use biography_core::Result;
use biography_core::badge::{BadgeProgress, BadgeRepository, compute_progress, pending_unlocks};
use biography_core::clock::Clock;
use std::sync::Arc;

pub struct BadgeService {
    badges: Arc<dyn BadgeRepository>,
    clock: Arc<dyn Clock>,
}

impl BadgeService {
    pub fn new(badges: Arc<dyn BadgeRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { badges, clock }
    }

    /// Progress for every badge, without recording anything.
    pub async fn progress(&self, user_id: &str) -> Result<Vec<BadgeProgress>> {
        let (metrics, recorded) =
            tokio::try_join!(self.badges.metrics(user_id), self.badges.unlocked(user_id))?;
        Ok(compute_progress(&metrics, &recorded))
    }

    /// Records every badge whose threshold is met but not yet recorded.
    ///
    /// Returns the newly unlocked ids. Unlocks are never retracted, so a
    /// metric dropping later leaves the badge unlocked.
    pub async fn record_unlocks(&self, user_id: &str) -> Result<Vec<String>> {
        let (metrics, recorded) =
            tokio::try_join!(self.badges.metrics(user_id), self.badges.unlocked(user_id))?;

        let now = self.clock.now();
        let mut unlocked = Vec::new();
        for badge_id in pending_unlocks(&metrics, &recorded) {
            if self.badges.record_unlock(user_id, badge_id, now).await? {
                tracing::info!(user_id = %user_id, "[BadgeService] Unlocked '{}'", badge_id);
                unlocked.push(badge_id.to_string());
            }
        }
        Ok(unlocked)
    }

    /// Records pending unlocks, then reports progress.
    pub async fn refresh(&self, user_id: &str) -> Result<Vec<BadgeProgress>> {
        self.record_unlocks(user_id).await?;
        self.progress(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use biography_core::clock::SystemClock;
    use biography_infrastructure::{SqliteBadgeRepository, connect_in_memory};
    use sqlx::SqlitePool;

    async fn seed(pool: &SqlitePool) {
        for sql in [
            "INSERT INTO users (id, username) VALUES ('u1', 'alice')",
            "INSERT INTO biographies (id, user_id, slug, name, visibility, created_at, updated_at) \
             VALUES ('b1', 'u1', 'alice', 'Alice', 'public', '2025-01-01T00:00:00+00:00', '2025-01-01T00:00:00+00:00')",
            "INSERT INTO biography_core_stories (id, biography_id, question_id, content, created_at, updated_at) \
             VALUES ('c1', 'b1', 'climbing_origin', 'A gym', '2025-01-01T00:00:00+00:00', '2025-01-01T00:00:00+00:00')",
        ] {
            sqlx::query(sql).execute(pool).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_record_unlocks_is_idempotent() {
        let pool = connect_in_memory().await.unwrap();
        seed(&pool).await;
        let service = BadgeService::new(
            Arc::new(SqliteBadgeRepository::new(pool.clone())),
            Arc::new(SystemClock),
        );

        let first = service.record_unlocks("u1").await.unwrap();
        assert_eq!(first, vec!["story_beginner".to_string()]);
        assert!(service.record_unlocks("u1").await.unwrap().is_empty());

        let progress = service.progress("u1").await.unwrap();
        let beginner = progress.iter().find(|p| p.badge_id == "story_beginner").unwrap();
        assert!(beginner.unlocked);
        assert_eq!(beginner.progress_percent, 100);
        let writer = progress.iter().find(|p| p.badge_id == "story_writer").unwrap();
        assert!(!writer.unlocked);
        assert_eq!(writer.progress_percent, 20);
    }

    #[tokio::test]
    async fn test_recorded_unlock_survives_metric_drop() {
        let pool = connect_in_memory().await.unwrap();
        seed(&pool).await;
        let service = BadgeService::new(
            Arc::new(SqliteBadgeRepository::new(pool.clone())),
            Arc::new(SystemClock),
        );
        service.record_unlocks("u1").await.unwrap();

        sqlx::query("DELETE FROM biography_core_stories")
            .execute(&pool)
            .await
            .unwrap();

        let progress = service.refresh("u1").await.unwrap();
        let beginner = progress.iter().find(|p| p.badge_id == "story_beginner").unwrap();
        assert_eq!(beginner.current_value, 0);
        assert!(beginner.unlocked);
    }
}
