//! Biography repository traits.

use super::model::{
    Biography, BiographyPatch, BiographyQuery, NewBiography, OwnerProfile, RecordAccess,
    StoredImages,
};
use crate::error::Result;
use crate::visibility::ReadPredicate;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// An abstract repository for the biography aggregate root.
///
/// Every viewer-facing read takes a [`ReadPredicate`]. A row the predicate
/// rejects is reported exactly like a missing row (`Ok(None)`), so callers
/// cannot learn that a private record exists.
///
/// Returned records never carry story content; callers attach it from the
/// content repository.
#[async_trait]
pub trait BiographyRepository: Send + Sync {
    /// Finds a biography by id, filtered by the predicate.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Biography))`: Found and readable
    /// - `Ok(None)`: Absent or invisible
    /// - `Err(_)`: Store failure
    async fn find_by_id(&self, id: &str, predicate: &ReadPredicate) -> Result<Option<Biography>>;

    /// Finds a biography by slug, filtered by the predicate.
    async fn find_by_slug(
        &self,
        slug: &str,
        predicate: &ReadPredicate,
    ) -> Result<Option<Biography>>;

    /// Finds the biography owned by a user, regardless of visibility.
    ///
    /// Only for the owner's own requests.
    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<Biography>>;

    /// Lists biographies newest-first.
    async fn find_many(
        &self,
        query: &BiographyQuery,
        predicate: &ReadPredicate,
    ) -> Result<Vec<Biography>>;

    /// Counts the rows [`find_many`](Self::find_many) would page over.
    async fn count(&self, query: &BiographyQuery, predicate: &ReadPredicate) -> Result<u64>;

    /// Lists featured `public` biographies, most recently published first.
    async fn find_featured(&self, limit: u32) -> Result<Vec<Biography>>;

    /// Current visibility and owner of the row with `slug`, unfiltered.
    ///
    /// Used to re-check cached snapshots against the store.
    async fn access_by_slug(&self, slug: &str) -> Result<Option<RecordAccess>>;

    /// Returns true when a slug is already taken.
    async fn slug_exists(&self, slug: &str) -> Result<bool>;

    /// Inserts a biography, stamping `published_at` when created `public`.
    async fn create(&self, biography: &NewBiography, now: DateTime<Utc>) -> Result<Biography>;

    /// Applies a column update.
    ///
    /// Stamps `published_at` on the first transition into `public` and never
    /// clears it.
    ///
    /// # Errors
    ///
    /// - `Validation` when the patch sets no field
    /// - `NotFound` when the row does not exist
    async fn update(
        &self,
        id: &str,
        patch: &BiographyPatch,
        now: DateTime<Utc>,
    ) -> Result<Biography>;

    /// Records an accepted autosave at `at`.
    async fn touch_autosave(&self, id: &str, at: DateTime<Utc>) -> Result<()>;

    /// Deletes the record with its story rows, likes and views.
    ///
    /// Returns the images the record itself referenced, or `None` when
    /// nothing was deleted.
    async fn delete(&self, id: &str) -> Result<Option<StoredImages>>;
}

/// Read access to owner profiles.
#[async_trait]
pub trait OwnerDirectory: Send + Sync {
    async fn find_profile(&self, user_id: &str) -> Result<Option<OwnerProfile>>;
}
