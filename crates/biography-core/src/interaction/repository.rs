//! Interaction repository trait.

use super::{BiographyStats, Comment, Follow, LikeOutcome};
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Persistence for follow edges, likes, views and comments.
///
/// # Implementation Notes
///
/// - `follow` / `unfollow` keep the followed user's biography `follower_count` in step
/// - `toggle_like` recomputes `total_likes` from the likes themselves
#[async_trait]
pub trait InteractionRepository: Send + Sync {
    /// Creates a follow edge.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Follow))`: Edge created
    /// - `Ok(None)`: Edge already existed; nothing changed
    async fn follow(
        &self,
        follower_id: &str,
        following_id: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<Follow>>;

    /// Removes a follow edge. Returns false when there was none.
    async fn unfollow(&self, follower_id: &str, following_id: &str) -> Result<bool>;

    async fn is_following(&self, follower_id: &str, following_id: &str) -> Result<bool>;

    /// Likes the biography, or removes an existing like.
    async fn toggle_like(
        &self,
        biography_id: &str,
        user_id: &str,
        at: DateTime<Utc>,
    ) -> Result<LikeOutcome>;

    /// Increments `total_views`; for signed-in viewers also records a distinct view.
    async fn record_view(
        &self,
        biography_id: &str,
        viewer_id: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<()>;

    async fn stats(&self, biography_id: &str) -> Result<BiographyStats>;

    async fn add_comment(&self, comment: &Comment) -> Result<()>;

    /// Comments on one biography, oldest first.
    async fn list_comments(&self, biography_id: &str) -> Result<Vec<Comment>>;

    async fn find_comment(&self, comment_id: &str) -> Result<Option<Comment>>;

    /// Returns false when no such comment existed.
    async fn delete_comment(&self, comment_id: &str) -> Result<bool>;
}
