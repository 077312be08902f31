//! SQLite implementation of [`InteractionRepository`].

use crate::error::db_error;
use async_trait::async_trait;
use biography_core::interaction::{
    BiographyStats, BucketListSummary, Comment, Follow, InteractionRepository, LikeOutcome,
};
use biography_core::{BiographyError, Result};
use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};

const COMMENT_COLUMNS: &str = "SELECT id, biography_id, user_id, content, created_at FROM comments";

#[derive(Debug, sqlx::FromRow)]
struct CommentRow {
    id: String,
    biography_id: String,
    user_id: String,
    content: String,
    created_at: DateTime<Utc>,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Self {
            id: row.id,
            biography_id: row.biography_id,
            user_id: row.user_id,
            content: row.content,
            created_at: row.created_at,
        }
    }
}

#[derive(Clone)]
pub struct SqliteInteractionRepository {
    pool: SqlitePool,
}

impl SqliteInteractionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Recomputes the followed user's `follower_count` from the edges.
    async fn refresh_follower_count(conn: &mut SqliteConnection, following_id: &str) -> Result<()> {
        sqlx::query(
            "UPDATE biographies SET follower_count = \
             (SELECT COUNT(*) FROM follows WHERE following_id = ?1) WHERE user_id = ?1",
        )
        .bind(following_id)
        .execute(&mut *conn)
        .await
        .map_err(db_error)?;
        Ok(())
    }
}

#[async_trait]
impl InteractionRepository for SqliteInteractionRepository {
    async fn follow(
        &self,
        follower_id: &str,
        following_id: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<Follow>> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let inserted = sqlx::query(
            "INSERT OR IGNORE INTO follows (follower_id, following_id, created_at) VALUES (?, ?, ?)",
        )
        .bind(follower_id)
        .bind(following_id)
        .bind(at)
        .execute(&mut *tx)
        .await
        .map_err(db_error)?
        .rows_affected();

        if inserted == 0 {
            return Ok(None);
        }

        Self::refresh_follower_count(&mut tx, following_id).await?;
        tx.commit().await.map_err(db_error)?;

        Ok(Some(Follow {
            follower_id: follower_id.to_string(),
            following_id: following_id.to_string(),
            created_at: at,
        }))
    }

    async fn unfollow(&self, follower_id: &str, following_id: &str) -> Result<bool> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let removed = sqlx::query("DELETE FROM follows WHERE follower_id = ? AND following_id = ?")
            .bind(follower_id)
            .bind(following_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?
            .rows_affected();

        if removed == 0 {
            return Ok(false);
        }

        Self::refresh_follower_count(&mut tx, following_id).await?;
        tx.commit().await.map_err(db_error)?;
        Ok(true)
    }

    async fn is_following(&self, follower_id: &str, following_id: &str) -> Result<bool> {
        let found: Option<(i64,)> =
            sqlx::query_as("SELECT 1 FROM follows WHERE follower_id = ? AND following_id = ?")
                .bind(follower_id)
                .bind(following_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error)?;
        Ok(found.is_some())
    }

    async fn toggle_like(
        &self,
        biography_id: &str,
        user_id: &str,
        at: DateTime<Utc>,
    ) -> Result<LikeOutcome> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let removed =
            sqlx::query("DELETE FROM biography_likes WHERE biography_id = ? AND user_id = ?")
                .bind(biography_id)
                .bind(user_id)
                .execute(&mut *tx)
                .await
                .map_err(db_error)?
                .rows_affected();

        let liked = removed == 0;
        if liked {
            sqlx::query(
                "INSERT INTO biography_likes (biography_id, user_id, created_at) VALUES (?, ?, ?)",
            )
            .bind(biography_id)
            .bind(user_id)
            .bind(at)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;
        }

        sqlx::query(
            "UPDATE biographies SET total_likes = \
             (SELECT COUNT(*) FROM biography_likes WHERE biography_id = ?1) WHERE id = ?1",
        )
        .bind(biography_id)
        .execute(&mut *tx)
        .await
        .map_err(db_error)?;

        let (like_count,): (i64,) =
            sqlx::query_as("SELECT total_likes FROM biographies WHERE id = ?")
                .bind(biography_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(db_error)?
                .ok_or_else(|| BiographyError::not_found("Biography", biography_id))?;

        tx.commit().await.map_err(db_error)?;
        Ok(LikeOutcome { liked, like_count })
    }

    async fn record_view(
        &self,
        biography_id: &str,
        viewer_id: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        sqlx::query("UPDATE biographies SET total_views = total_views + 1 WHERE id = ?")
            .bind(biography_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

        if let Some(viewer_id) = viewer_id {
            sqlx::query(
                "INSERT OR IGNORE INTO biography_views (biography_id, viewer_id, first_viewed_at) \
                 VALUES (?, ?, ?)",
            )
            .bind(biography_id)
            .bind(viewer_id)
            .bind(at)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;
        }

        tx.commit().await.map_err(db_error)
    }

    async fn stats(&self, biography_id: &str) -> Result<BiographyStats> {
        let counters: Option<(i64, i64, i64)> = sqlx::query_as(
            "SELECT total_likes, total_views, follower_count FROM biographies WHERE id = ?",
        )
        .bind(biography_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;
        let (total_likes, total_views, follower_count) =
            counters.ok_or_else(|| BiographyError::not_found("Biography", biography_id))?;

        let (total, active, completed): (i64, i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), \
                COALESCE(SUM(CASE WHEN status = 'active' THEN 1 ELSE 0 END), 0), \
                COALESCE(SUM(CASE WHEN status = 'completed' THEN 1 ELSE 0 END), 0) \
             FROM bucket_list_items WHERE biography_id = ? AND is_public = 1",
        )
        .bind(biography_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(BiographyStats {
            total_likes,
            total_views,
            follower_count,
            bucket_list: BucketListSummary {
                total,
                active,
                completed,
            },
        })
    }

    async fn add_comment(&self, comment: &Comment) -> Result<()> {
        sqlx::query(
            "INSERT INTO comments (id, biography_id, user_id, content, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&comment.id)
        .bind(&comment.biography_id)
        .bind(&comment.user_id)
        .bind(&comment.content)
        .bind(comment.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(())
    }

    async fn list_comments(&self, biography_id: &str) -> Result<Vec<Comment>> {
        let rows: Vec<CommentRow> = sqlx::query_as(&format!(
            "{COMMENT_COLUMNS} WHERE biography_id = ? ORDER BY created_at ASC, rowid ASC"
        ))
        .bind(biography_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(rows.into_iter().map(Comment::from).collect())
    }

    async fn find_comment(&self, comment_id: &str) -> Result<Option<Comment>> {
        let row: Option<CommentRow> = sqlx::query_as(&format!("{COMMENT_COLUMNS} WHERE id = ?"))
            .bind(comment_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(row.map(Comment::from))
    }

    async fn delete_comment(&self, comment_id: &str) -> Result<bool> {
        let removed = sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(comment_id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?
            .rows_affected();
        Ok(removed > 0)
    }
}
