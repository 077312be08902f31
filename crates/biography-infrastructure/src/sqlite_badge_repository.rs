//! SQLite implementation of [`BadgeRepository`].

use crate::error::db_error;
use async_trait::async_trait;
use biography_core::Result;
use biography_core::badge::{BadgeMetrics, BadgeRepository};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::collections::HashSet;

/// Every aggregate in one round trip. `?1` is the user id.
const METRICS_QUERY: &str = r#"
WITH own AS (SELECT id FROM biographies WHERE user_id = ?1)
SELECT
    (SELECT COUNT(*) FROM biography_core_stories WHERE biography_id IN (SELECT id FROM own))
      + (SELECT COUNT(*) FROM biography_stories WHERE biography_id IN (SELECT id FROM own))
      AS stories_completed,
    (SELECT COUNT(*) FROM story_encouragements WHERE biography_id IN (SELECT id FROM own))
      AS encouragements_received,
    (SELECT COUNT(*) FROM biography_likes WHERE biography_id IN (SELECT id FROM own))
      AS likes_received,
    (SELECT COUNT(*) FROM bucket_list_items WHERE biography_id IN (SELECT id FROM own))
      AS goals_created,
    (SELECT COUNT(*) FROM bucket_list_items
       WHERE biography_id IN (SELECT id FROM own) AND status = 'completed')
      AS goals_completed,
    (SELECT COUNT(*) FROM biography_likes WHERE user_id = ?1) AS likes_given,
    (SELECT COUNT(*) FROM comments WHERE user_id = ?1) AS comments_posted,
    (SELECT COUNT(*) FROM biography_views
       WHERE viewer_id = ?1 AND biography_id NOT IN (SELECT id FROM own))
      AS biographies_read,
    (SELECT COUNT(*) FROM climbing_locations WHERE biography_id IN (SELECT id FROM own))
      AS locations_added,
    (SELECT COUNT(*) FROM climbing_locations
       WHERE biography_id IN (SELECT id FROM own) AND is_international = 1)
      AS international_locations_added
"#;

#[derive(sqlx::FromRow)]
struct MetricsRow {
    stories_completed: i64,
    encouragements_received: i64,
    likes_received: i64,
    goals_created: i64,
    goals_completed: i64,
    likes_given: i64,
    comments_posted: i64,
    biographies_read: i64,
    locations_added: i64,
    international_locations_added: i64,
}

fn count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or_default()
}

impl From<MetricsRow> for BadgeMetrics {
    fn from(row: MetricsRow) -> Self {
        Self {
            stories_completed: count(row.stories_completed),
            encouragements_received: count(row.encouragements_received),
            likes_received: count(row.likes_received),
            goals_created: count(row.goals_created),
            goals_completed: count(row.goals_completed),
            likes_given: count(row.likes_given),
            comments_posted: count(row.comments_posted),
            biographies_read: count(row.biographies_read),
            locations_added: count(row.locations_added),
            international_locations_added: count(row.international_locations_added),
        }
    }
}

#[derive(Clone)]
pub struct SqliteBadgeRepository {
    pool: SqlitePool,
}

impl SqliteBadgeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BadgeRepository for SqliteBadgeRepository {
    async fn metrics(&self, user_id: &str) -> Result<BadgeMetrics> {
        let row: MetricsRow = sqlx::query_as(METRICS_QUERY)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(row.into())
    }

    async fn unlocked(&self, user_id: &str) -> Result<HashSet<String>> {
        let rows: Vec<(String,)> = sqlx::query_as("SELECT badge_id FROM user_badges WHERE user_id = ?")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    async fn record_unlock(
        &self,
        user_id: &str,
        badge_id: &str,
        at: DateTime<Utc>,
    ) -> Result<bool> {
        let written = sqlx::query(
            "INSERT OR IGNORE INTO user_badges (user_id, badge_id, unlocked_at) VALUES (?, ?, ?)",
        )
        .bind(user_id)
        .bind(badge_id)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(db_error)?
        .rows_affected();
        Ok(written > 0)
    }
}
