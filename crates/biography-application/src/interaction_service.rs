//! Follow, like, view and comment interactions.
//!
//! Every operation first resolves the target biography through the viewer's
//! read predicate, so an invisible record is indistinguishable from a
//! missing one here too.

use biography_core::biography::{Biography, BiographyRepository, Identifier};
use biography_core::clock::Clock;
use biography_core::event::{BiographyEvent, EventPublisher};
use biography_core::interaction::{
    BiographyStats, Comment, Follow, InteractionRepository, LikeOutcome, MAX_COMMENT_CHARS,
};
use biography_core::{BiographyError, ReadPredicate, Result, Viewer, Visibility};
use std::sync::Arc;
use uuid::Uuid;

pub struct InteractionService {
    biographies: Arc<dyn BiographyRepository>,
    interactions: Arc<dyn InteractionRepository>,
    events: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
}

impl InteractionService {
    pub fn new(
        biographies: Arc<dyn BiographyRepository>,
        interactions: Arc<dyn InteractionRepository>,
        events: Arc<dyn EventPublisher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            biographies,
            interactions,
            events,
            clock,
        }
    }

    /// Follows the owner of a biography.
    ///
    /// # Errors
    ///
    /// - `NotFound` when the biography is absent or unreadable
    /// - `Forbidden` for `private`/`anonymous` targets and for self-follows
    /// - `Conflict` when already following
    pub async fn follow(&self, user_id: &str, biography: &str) -> Result<Follow> {
        let target = self.readable(biography, &Viewer::user(user_id)).await?;
        let owner_id = followable_owner(&target, user_id)?;

        let follow = self
            .interactions
            .follow(user_id, &owner_id, self.clock.now())
            .await?
            .ok_or_else(|| BiographyError::conflict("already following this user"))?;

        tracing::info!(follower_id = %user_id, following_id = %owner_id, "[InteractionService] Followed");
        self.emit(BiographyEvent::NewFollower {
            follower_id: user_id.to_string(),
            following_id: owner_id,
        })
        .await;
        Ok(follow)
    }

    /// Removes a follow edge.
    ///
    /// # Errors
    ///
    /// `NotFound` when the biography is unreadable or no edge exists.
    pub async fn unfollow(&self, user_id: &str, biography: &str) -> Result<()> {
        let target = self.readable(biography, &Viewer::user(user_id)).await?;
        let owner_id = target
            .owner_id()
            .ok_or_else(|| BiographyError::not_found("Follow", &target.id))?;

        if !self.interactions.unfollow(user_id, owner_id).await? {
            return Err(BiographyError::not_found("Follow", owner_id));
        }
        tracing::info!(follower_id = %user_id, following_id = %owner_id, "[InteractionService] Unfollowed");
        Ok(())
    }

    /// Whether the caller follows the owner of a readable biography.
    pub async fn follow_status(&self, user_id: &str, biography: &str) -> Result<bool> {
        let target = self.readable(biography, &Viewer::user(user_id)).await?;
        match target.owner_id() {
            Some(owner_id) => self.interactions.is_following(user_id, owner_id).await,
            None => Ok(false),
        }
    }

    /// Toggles the caller's like on a readable biography.
    pub async fn toggle_like(&self, user_id: &str, biography: &str) -> Result<LikeOutcome> {
        let target = self.readable(biography, &Viewer::user(user_id)).await?;
        let outcome = self
            .interactions
            .toggle_like(&target.id, user_id, self.clock.now())
            .await?;

        if outcome.liked {
            if let Some(owner_id) = target.owner_id().filter(|owner| *owner != user_id) {
                self.emit(BiographyEvent::BiographyLiked {
                    biography_id: target.id.clone(),
                    owner_id: owner_id.to_string(),
                    liker_id: user_id.to_string(),
                })
                .await;
            }
        }
        Ok(outcome)
    }

    /// Counts a view of a readable biography. Owners viewing their own
    /// record are not counted.
    pub async fn record_view(&self, viewer: &Viewer, biography: &str) -> Result<()> {
        let target = self.readable(biography, viewer).await?;
        if viewer.owns(target.owner_id()) {
            return Ok(());
        }
        self.interactions
            .record_view(&target.id, viewer.id(), self.clock.now())
            .await
    }

    pub async fn stats(&self, viewer: &Viewer, biography: &str) -> Result<BiographyStats> {
        let target = self.readable(biography, viewer).await?;
        self.interactions.stats(&target.id).await
    }

    /// Leaves a comment on a readable biography. The body is trimmed.
    ///
    /// # Errors
    ///
    /// - `NotFound` when the biography is absent or unreadable
    /// - `ValidationError` for a blank or overlong body
    pub async fn add_comment(&self, user_id: &str, biography: &str, content: &str) -> Result<Comment> {
        let target = self.readable(biography, &Viewer::user(user_id)).await?;
        let content = comment_body(content)?;

        let comment = Comment {
            id: Uuid::new_v4().to_string(),
            biography_id: target.id.clone(),
            user_id: user_id.to_string(),
            content,
            created_at: self.clock.now(),
        };
        self.interactions.add_comment(&comment).await?;
        tracing::info!(comment_id = %comment.id, biography_id = %target.id, "[InteractionService] Comment added");

        if let Some(owner_id) = target.owner_id().filter(|owner| *owner != user_id) {
            self.emit(BiographyEvent::BiographyCommented {
                biography_id: target.id.clone(),
                owner_id: owner_id.to_string(),
                commenter_id: user_id.to_string(),
                comment_id: comment.id.clone(),
            })
            .await;
        }
        Ok(comment)
    }

    pub async fn list_comments(&self, viewer: &Viewer, biography: &str) -> Result<Vec<Comment>> {
        let target = self.readable(biography, viewer).await?;
        self.interactions.list_comments(&target.id).await
    }

    /// Deletes one of the caller's own comments.
    ///
    /// # Errors
    ///
    /// - `NotFound` when the biography is unreadable or the comment is not on it
    /// - `Forbidden` when the caller did not write the comment
    pub async fn delete_comment(&self, user_id: &str, biography: &str, comment_id: &str) -> Result<()> {
        let target = self.readable(biography, &Viewer::user(user_id)).await?;
        let comment = self
            .interactions
            .find_comment(comment_id)
            .await?
            .filter(|comment| comment.biography_id == target.id)
            .ok_or_else(|| BiographyError::not_found("Comment", comment_id))?;

        if comment.user_id != user_id {
            return Err(BiographyError::forbidden("only the author may delete a comment"));
        }
        if !self.interactions.delete_comment(comment_id).await? {
            return Err(BiographyError::not_found("Comment", comment_id));
        }
        tracing::info!(comment_id = %comment_id, "[InteractionService] Comment deleted");
        Ok(())
    }

    async fn readable(&self, id_or_slug: &str, viewer: &Viewer) -> Result<Biography> {
        let predicate = ReadPredicate::for_viewer(viewer);
        let found = match Identifier::parse(id_or_slug) {
            Identifier::Id(id) => self.biographies.find_by_id(id, &predicate).await?,
            Identifier::Slug(slug) => self.biographies.find_by_slug(slug, &predicate).await?,
        };
        found.ok_or_else(|| BiographyError::not_found("Biography", id_or_slug))
    }

    async fn emit(&self, event: BiographyEvent) {
        let name = event.name();
        if let Err(e) = self.events.publish(event).await {
            tracing::warn!("[InteractionService] Failed to publish {} event: {}", name, e);
        }
    }
}

/// The owner a viewer may follow through this biography.
fn followable_owner(target: &Biography, follower_id: &str) -> Result<String> {
    match target.visibility {
        Visibility::Private | Visibility::Anonymous => {
            return Err(BiographyError::forbidden(format!(
                "cannot follow a {} biography",
                target.visibility
            )));
        }
        Visibility::Community | Visibility::Public => {}
    }
    let owner_id = target
        .owner_id()
        .ok_or_else(|| BiographyError::forbidden("biography has no owner to follow"))?;
    if owner_id == follower_id {
        return Err(BiographyError::forbidden("cannot follow yourself"));
    }
    Ok(owner_id.to_string())
}

fn comment_body(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(BiographyError::validation("comment content must not be empty"));
    }
    if trimmed.chars().count() > MAX_COMMENT_CHARS {
        return Err(BiographyError::validation(format!(
            "comment content exceeds {MAX_COMMENT_CHARS} characters"
        )));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Harness;
    use biography_core::biography::BiographyInput;
    use serde_json::json;

    async fn with_biography(h: &Harness, user: &str, visibility: &str) -> Biography {
        h.add_user(user, user, None).await;
        let input: BiographyInput =
            serde_json::from_value(json!({ "visibility": visibility })).unwrap();
        h.biographies.upsert_my(user, input).await.unwrap().0
    }

    #[tokio::test]
    async fn test_follow_rules() {
        let h = Harness::new().await;
        let public = with_biography(&h, "alice", "public").await;
        let anonymous = with_biography(&h, "bob", "anonymous").await;
        let private = with_biography(&h, "carol", "private").await;
        h.add_user("dave", "dave", None).await;

        let follow = h.interactions.follow("dave", &public.id).await.unwrap();
        assert_eq!(follow.following_id, "alice");
        assert!(h.interactions.follow("dave", &public.id).await.unwrap_err().is_conflict());
        assert!(h.interactions.follow("alice", &public.id).await.unwrap_err().is_forbidden());
        assert!(h.interactions.follow("dave", &anonymous.id).await.unwrap_err().is_forbidden());
        assert!(h.interactions.follow("dave", &private.id).await.unwrap_err().is_not_found());

        let stats = h.interactions.stats(&Viewer::guest(), &public.slug).await.unwrap();
        assert_eq!(stats.follower_count, 1);
        assert!(h.events.events().contains(&BiographyEvent::NewFollower {
            follower_id: "dave".into(),
            following_id: "alice".into(),
        }));

        assert!(h.interactions.follow_status("dave", &public.slug).await.unwrap());
        h.interactions.unfollow("dave", &public.id).await.unwrap();
        assert!(!h.interactions.follow_status("dave", &public.slug).await.unwrap());
        assert!(h.interactions.unfollow("dave", &public.id).await.unwrap_err().is_not_found());
        assert!(
            h.interactions
                .follow_status("dave", &private.id)
                .await
                .unwrap_err()
                .is_not_found()
        );
    }

    #[tokio::test]
    async fn test_like_toggle_notifies_owner_only_for_others() {
        let h = Harness::new().await;
        let bio = with_biography(&h, "alice", "community").await;
        h.add_user("bob", "bob", None).await;

        let liked = h.interactions.toggle_like("bob", &bio.id).await.unwrap();
        assert_eq!(liked, LikeOutcome { liked: true, like_count: 1 });
        h.interactions.toggle_like("alice", &bio.id).await.unwrap();

        let likes = h
            .events
            .events()
            .into_iter()
            .filter(|e| matches!(e, BiographyEvent::BiographyLiked { .. }))
            .count();
        assert_eq!(likes, 1);

        let unliked = h.interactions.toggle_like("bob", &bio.id).await.unwrap();
        assert_eq!(unliked, LikeOutcome { liked: false, like_count: 1 });
    }

    #[tokio::test]
    async fn test_views_skip_owner_and_hidden_records() {
        let h = Harness::new().await;
        let bio = with_biography(&h, "alice", "public").await;
        let hidden = with_biography(&h, "bob", "community").await;

        h.interactions.record_view(&Viewer::guest(), &bio.id).await.unwrap();
        h.interactions.record_view(&Viewer::user("bob"), &bio.id).await.unwrap();
        h.interactions.record_view(&Viewer::user("alice"), &bio.id).await.unwrap();
        assert!(
            h.interactions
                .record_view(&Viewer::guest(), &hidden.id)
                .await
                .unwrap_err()
                .is_not_found()
        );

        let stats = h.interactions.stats(&Viewer::guest(), &bio.id).await.unwrap();
        assert_eq!(stats.total_views, 2);

        let read = h.badges.progress("bob").await.unwrap();
        let explorer = read.iter().find(|p| p.badge_id == "explorer").unwrap();
        assert_eq!(explorer.current_value, 1);
    }

    #[tokio::test]
    async fn test_comment_lifecycle() {
        let h = Harness::new().await;
        let bio = with_biography(&h, "alice", "public").await;
        h.add_user("bob", "bob", None).await;

        let comment = h
            .interactions
            .add_comment("bob", &bio.slug, "  Great send!  ")
            .await
            .unwrap();
        assert_eq!(comment.content, "Great send!");
        assert_eq!(comment.biography_id, bio.id);
        h.interactions.add_comment("alice", &bio.id, "Thanks").await.unwrap();

        let listed = h.interactions.list_comments(&Viewer::guest(), &bio.id).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, comment.id);

        let notified = h
            .events
            .events()
            .into_iter()
            .filter(|e| matches!(e, BiographyEvent::BiographyCommented { .. }))
            .count();
        assert_eq!(notified, 1);

        assert!(
            h.interactions
                .delete_comment("alice", &bio.id, &comment.id)
                .await
                .unwrap_err()
                .is_forbidden()
        );
        h.interactions.delete_comment("bob", &bio.id, &comment.id).await.unwrap();
        assert!(
            h.interactions
                .delete_comment("bob", &bio.id, &comment.id)
                .await
                .unwrap_err()
                .is_not_found()
        );
        assert_eq!(
            h.interactions.list_comments(&Viewer::guest(), &bio.id).await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn test_comment_rules() {
        let h = Harness::new().await;
        let bio = with_biography(&h, "alice", "public").await;
        let private = with_biography(&h, "carol", "private").await;
        let other = with_biography(&h, "dave", "public").await;

        assert!(h.interactions.add_comment("bob", &bio.id, "   ").await.unwrap_err().is_validation());
        let long = "a".repeat(MAX_COMMENT_CHARS + 1);
        assert!(h.interactions.add_comment("bob", &bio.id, &long).await.unwrap_err().is_validation());
        assert!(h.interactions.add_comment("bob", &private.id, "Hi").await.unwrap_err().is_not_found());
        assert!(
            h.interactions
                .list_comments(&Viewer::guest(), &private.id)
                .await
                .unwrap_err()
                .is_not_found()
        );

        let comment = h.interactions.add_comment("bob", &bio.id, "Hi").await.unwrap();
        assert!(
            h.interactions
                .delete_comment("bob", &other.id, &comment.id)
                .await
                .unwrap_err()
                .is_not_found()
        );
    }

    #[tokio::test]
    async fn test_comments_feed_conversationalist_progress() {
        let h = Harness::new().await;
        let bio = with_biography(&h, "alice", "public").await;
        h.add_user("bob", "bob", None).await;
        for n in 0..3 {
            h.interactions
                .add_comment("bob", &bio.id, &format!("Comment {n}"))
                .await
                .unwrap();
        }

        let progress = h.badges.progress("bob").await.unwrap();
        let badge = progress
            .iter()
            .find(|p| p.badge_id == "conversationalist")
            .unwrap();
        assert_eq!(badge.current_value, 3);
        assert!(!badge.unlocked);
    }
}
