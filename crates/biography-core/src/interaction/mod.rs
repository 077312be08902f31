//! Follows, likes, views and comments.
//!
//! These are thin callers of the biography core: access to the target record
//! is always decided by the read predicate before any of these run.

pub mod repository;

use chrono::{DateTime, Utc};
use serde::Serialize;

pub use repository::InteractionRepository;

/// Directed edge between two users. No self-edges; one edge per ordered pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Follow {
    pub follower_id: String,
    pub following_id: String,
    pub created_at: DateTime<Utc>,
}

/// Result of a like toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LikeOutcome {
    pub liked: bool,
    pub like_count: i64,
}

/// Longest accepted comment body, in characters.
pub const MAX_COMMENT_CHARS: usize = 2000;

/// A comment left on a biography. Only its author may delete it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    pub id: String,
    pub biography_id: String,
    pub user_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BucketListSummary {
    pub total: i64,
    pub active: i64,
    pub completed: i64,
}

/// Public counters of one biography.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BiographyStats {
    pub total_likes: i64,
    pub total_views: i64,
    pub follower_count: i64,
    pub bucket_list: BucketListSummary,
}
