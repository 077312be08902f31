//! Badge repository trait.

use super::model::BadgeMetrics;
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashSet;

/// Aggregate reads and unlock facts for badges.
#[async_trait]
pub trait BadgeRepository: Send + Sync {
    /// Gathers every aggregate the badge table measures.
    async fn metrics(&self, user_id: &str) -> Result<BadgeMetrics>;

    /// Badge ids already unlocked by the user.
    async fn unlocked(&self, user_id: &str) -> Result<HashSet<String>>;

    /// Records an unlock. Recording an existing unlock is a no-op.
    ///
    /// Returns true when a new fact was written.
    async fn record_unlock(
        &self,
        user_id: &str,
        badge_id: &str,
        at: DateTime<Utc>,
    ) -> Result<bool>;
}
