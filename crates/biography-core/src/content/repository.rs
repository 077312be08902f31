//! Content repository trait.
//!
//! Defines the interface between the aggregated story shapes and their
//! normalized storage (core stories, one-liners, categorized stories).

use super::model::{OneLiners, OneLinersInput, Stories, StoriesInput};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// An abstract repository for story content.
///
/// # Implementation Notes
///
/// Implementations must:
/// - Issue a bounded number of queries per table for batch reads, never one per id
/// - Never store an empty or whitespace-only answer (blank input deletes the row)
/// - Route the core question ids to the core-story collection on every sync call
/// - Leave questions absent from the input untouched
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Loads core stories and one-liners for many biographies at once.
    ///
    /// # Arguments
    ///
    /// * `biography_ids` - Biographies to load content for
    ///
    /// # Returns
    ///
    /// - `Ok(map)`: Keyed by biography id. Ids without content are absent.
    /// - `Err(_)`: Store failure
    async fn batch_get_one_liners(
        &self,
        biography_ids: &[String],
    ) -> Result<HashMap<String, OneLiners>>;

    /// Loads categorized stories for many biographies at once.
    ///
    /// Rows with no category surface under `"uncategorized"`.
    async fn batch_get_stories(&self, biography_ids: &[String])
    -> Result<HashMap<String, Stories>>;

    /// Applies a one-liner submission with diff-to-empty-deletes semantics.
    ///
    /// Core question ids are written to the core-story collection.
    async fn sync_one_liners(&self, biography_id: &str, input: &OneLinersInput) -> Result<()>;

    /// Applies a categorized-story submission with diff-to-empty-deletes semantics.
    ///
    /// Core question ids are written to the core-story collection. An unknown
    /// category falls back to the question's catalogue category.
    async fn sync_stories(&self, biography_id: &str, input: &StoriesInput) -> Result<()>;
}
