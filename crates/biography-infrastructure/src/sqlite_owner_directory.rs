//! SQLite implementation of [`OwnerDirectory`] over the `users` table.

use crate::error::db_error;
use async_trait::async_trait;
use biography_core::Result;
use biography_core::biography::{OwnerDirectory, OwnerProfile};
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct SqliteOwnerDirectory {
    pool: SqlitePool,
}

impl SqliteOwnerDirectory {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Inserts or refreshes a profile mirrored from the identity provider.
    pub async fn upsert_profile(&self, profile: &OwnerProfile) -> Result<()> {
        sqlx::query(
            "INSERT INTO users (id, username, display_name, avatar_url) VALUES (?, ?, ?, ?) \
             ON CONFLICT(id) DO UPDATE SET username = excluded.username, \
             display_name = excluded.display_name, avatar_url = excluded.avatar_url",
        )
        .bind(&profile.id)
        .bind(&profile.username)
        .bind(&profile.display_name)
        .bind(&profile.avatar_url)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(())
    }
}

#[async_trait]
impl OwnerDirectory for SqliteOwnerDirectory {
    async fn find_profile(&self, user_id: &str) -> Result<Option<OwnerProfile>> {
        let row: Option<(String, String, Option<String>, Option<String>)> = sqlx::query_as(
            "SELECT id, username, display_name, avatar_url FROM users WHERE id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.map(|(id, username, display_name, avatar_url)| OwnerProfile {
            id,
            username,
            display_name,
            avatar_url,
        }))
    }
}
