//! One-way domain events.
//!
//! Delivery (notifications, feeds) happens outside the engine. Publishing is
//! fire-and-forget: callers log and swallow failures.

use crate::error::Result;
use async_trait::async_trait;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BiographyEvent {
    /// First transition of a biography into `public`.
    Published {
        biography_id: String,
        user_id: String,
    },
    NewFollower {
        follower_id: String,
        following_id: String,
    },
    BiographyLiked {
        biography_id: String,
        owner_id: String,
        liker_id: String,
    },
    BiographyCommented {
        biography_id: String,
        owner_id: String,
        commenter_id: String,
        comment_id: String,
    },
    Deleted {
        biography_id: String,
        user_id: String,
    },
}

impl BiographyEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Published { .. } => "published",
            Self::NewFollower { .. } => "new_follower",
            Self::BiographyLiked { .. } => "biography_liked",
            Self::BiographyCommented { .. } => "biography_commented",
            Self::Deleted { .. } => "deleted",
        }
    }
}

#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: BiographyEvent) -> Result<()>;
}
