use super::cache::BiographyCache;
use biography_core::autosave::{AutosaveOutcome, AutosaveState, AutosaveThrottle};
use biography_core::biography::presentation::{
    normalize_slug, resolve_display_name, slug_candidates,
};
use biography_core::biography::{
    Biography, BiographyField, BiographyInput, BiographyPatch, BiographyQuery,
    BiographyRepository, Identifier, NewBiography, NormalizedInput, OwnerDirectory, Page,
    Pagination, mask_for_viewer,
};
use biography_core::cache::CacheStore;
use biography_core::clock::Clock;
use biography_core::config::{AppConfig, DisplayConfig, PaginationConfig};
use biography_core::content::{ContentRepository, ContentUpdate};
use biography_core::event::{BiographyEvent, EventPublisher};
use biography_core::media::MediaStore;
use biography_core::visibility::{can_edit, can_view};
use biography_core::{BiographyError, ReadPredicate, Result, Viewer, Visibility};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

/// Featured list size when the caller does not ask for one.
pub const DEFAULT_FEATURED_LIMIT: u32 = 6;

/// Collaborators of [`BiographyService`].
#[derive(Clone)]
pub struct BiographyPorts {
    pub biographies: Arc<dyn BiographyRepository>,
    pub content: Arc<dyn ContentRepository>,
    pub owners: Arc<dyn OwnerDirectory>,
    pub cache: Arc<dyn CacheStore>,
    pub events: Arc<dyn EventPublisher>,
    pub media: Arc<dyn MediaStore>,
    pub clock: Arc<dyn Clock>,
}

/// Listing parameters as received from the caller, before clamping.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListRequest {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub featured: Option<bool>,
    pub search: Option<String>,
}

/// How a save entry point treats a first write and which columns it may touch.
#[derive(Debug, Clone, Copy)]
struct SaveMode {
    name: &'static str,
    default_visibility: Visibility,
    fields: &'static [BiographyField],
    requires_name: bool,
}

impl SaveMode {
    /// `POST /biographies`: explicit creation, starts private.
    const EXPLICIT: SaveMode = SaveMode {
        name: "create_or_update",
        default_visibility: Visibility::Private,
        fields: BiographyField::FULL_SAVE,
        requires_name: true,
    };

    /// `PUT /biographies/me`: implicit upsert from the editor, starts public.
    const EDITOR: SaveMode = SaveMode {
        name: "upsert_my",
        default_visibility: Visibility::Public,
        fields: BiographyField::EDITOR,
        requires_name: false,
    };
}

/// The single entry point for reading and writing biographies.
///
/// Reads apply the viewer's [`ReadPredicate`] first and anonymous masking
/// second. Writes are owner-scoped: the caller's user id selects the record.
/// Every successful write invalidates the cache for the record's slug.
pub struct BiographyService {
    biographies: Arc<dyn BiographyRepository>,
    content: Arc<dyn ContentRepository>,
    owners: Arc<dyn OwnerDirectory>,
    cache: BiographyCache,
    events: Arc<dyn EventPublisher>,
    media: Arc<dyn MediaStore>,
    clock: Arc<dyn Clock>,
    throttle: AutosaveThrottle,
    display: DisplayConfig,
    pagination: PaginationConfig,
}

impl BiographyService {
    pub fn new(ports: BiographyPorts, config: &AppConfig) -> Self {
        Self {
            biographies: ports.biographies,
            content: ports.content,
            owners: ports.owners,
            cache: BiographyCache::new(ports.cache, &config.cache),
            events: ports.events,
            media: ports.media,
            clock: ports.clock,
            throttle: AutosaveThrottle::new(config.autosave.min_interval_ms),
            display: config.display.clone(),
            pagination: config.pagination.clone(),
        }
    }

    /// Paginated listing filtered by the viewer's predicate, newest first.
    pub async fn list(&self, request: ListRequest, viewer: &Viewer) -> Result<Page<Biography>> {
        let (page, limit) = self.pagination.resolve(request.page, request.limit);
        let query = BiographyQuery {
            page,
            limit,
            featured: request.featured,
            search: request
                .search
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        };
        let predicate = ReadPredicate::for_viewer(viewer);

        let (rows, total) = tokio::try_join!(
            self.biographies.find_many(&query, &predicate),
            self.biographies.count(&query, &predicate),
        )?;

        let data = self
            .attach_content(rows)
            .await?
            .into_iter()
            .map(|bio| self.mask(bio, viewer))
            .collect();

        Ok(Page {
            data,
            pagination: Pagination::new(page, limit, total),
        })
    }

    /// Featured public biographies for the landing page.
    pub async fn featured(&self, limit: Option<u32>) -> Result<Vec<Biography>> {
        let limit = limit
            .unwrap_or(DEFAULT_FEATURED_LIMIT)
            .clamp(1, self.pagination.max_limit.max(1));

        if let Some(cached) = self.cache.featured(limit).await {
            tracing::debug!("[BiographyService] Featured cache hit (limit {})", limit);
            return Ok(cached);
        }

        let rows = self.biographies.find_featured(limit).await?;
        let featured = self.attach_content(rows).await?;
        self.cache.store_featured(limit, &featured).await;
        Ok(featured)
    }

    /// Reads one biography by id or slug.
    ///
    /// # Errors
    ///
    /// `NotFound` when the record is absent or the viewer may not read it.
    pub async fn get(&self, id_or_slug: &str, viewer: &Viewer) -> Result<Biography> {
        match Identifier::parse(id_or_slug) {
            Identifier::Id(id) => {
                let predicate = ReadPredicate::for_viewer(viewer);
                let found = self
                    .biographies
                    .find_by_id(id, &predicate)
                    .await?
                    .filter(|bio| readable_by(bio, viewer))
                    .ok_or_else(|| BiographyError::not_found("Biography", id))?;
                let found = self.attach_one(found).await?;
                Ok(self.mask(found, viewer))
            }
            Identifier::Slug(slug) => self.get_by_slug(slug, viewer).await,
        }
    }

    /// Reads one biography by slug through the detail cache.
    ///
    /// Only guests are served from the cache, and only while the stored
    /// record is still `public`. A cached snapshot of a record that has since
    /// left `public` is dropped and the read falls through to the store.
    pub async fn get_by_slug(&self, slug: &str, viewer: &Viewer) -> Result<Biography> {
        if !viewer.is_authenticated() {
            if let Some(cached) = self.cache.detail(slug).await {
                if self.still_public(slug, viewer).await? {
                    tracing::debug!(slug = %slug, "[BiographyService] Detail cache hit");
                    return Ok(cached);
                }
                tracing::warn!(slug = %slug, "[BiographyService] Dropping stale cached detail");
                self.cache.invalidate(slug).await;
            }
        }

        let predicate = ReadPredicate::for_viewer(viewer);
        let found = self
            .biographies
            .find_by_slug(slug, &predicate)
            .await?
            .filter(|bio| readable_by(bio, viewer))
            .ok_or_else(|| BiographyError::not_found("Biography", slug))?;
        let found = self.attach_one(found).await?;

        self.cache.store_detail(&found).await;
        Ok(self.mask(found, viewer))
    }

    /// The caller's own record, unmasked and regardless of visibility.
    pub async fn get_my(&self, user_id: &str) -> Result<Option<Biography>> {
        match self.biographies.find_by_user_id(user_id).await? {
            Some(found) => Ok(Some(self.attach_one(found).await?)),
            None => Ok(None),
        }
    }

    /// Explicit save. Requires `name`; first creation defaults to `private`.
    ///
    /// Returns the saved record and whether it was created.
    pub async fn create_or_update(
        &self,
        user_id: &str,
        input: BiographyInput,
    ) -> Result<(Biography, bool)> {
        self.resolve_or_create(user_id, input.normalize(), SaveMode::EXPLICIT)
            .await
    }

    /// Editor save. First creation defaults to `public`; featured and video
    /// columns are not writable here.
    pub async fn upsert_my(
        &self,
        user_id: &str,
        input: BiographyInput,
    ) -> Result<(Biography, bool)> {
        self.resolve_or_create(user_id, input.normalize(), SaveMode::EDITOR)
            .await
    }

    /// Throttled partial save.
    ///
    /// Only the autosave columns and story content are written. A call within
    /// the throttle interval of the last accepted autosave writes nothing and
    /// reports the previous timestamp.
    pub async fn autosave(&self, user_id: &str, input: BiographyInput) -> Result<AutosaveOutcome> {
        let input = input.normalize();
        self.log_ignored(user_id, "autosave", &input.ignored);
        let patch = input.patch.restricted_to(BiographyField::AUTOSAVE);
        let now = self.clock.now();

        let (current, created) = match self.biographies.find_by_user_id(user_id).await? {
            Some(existing) => {
                ensure_editable(&existing, user_id)?;
                (existing, false)
            }
            None => {
                let created = self
                    .create_for_owner(user_id, patch.clone(), Visibility::Public)
                    .await?;
                (created, true)
            }
        };

        if let AutosaveState::Throttled {
            last_autosave_at,
            retry_after_ms,
        } = self.throttle.evaluate(current.autosave_at, now)
        {
            tracing::debug!(
                biography_id = %current.id,
                "[BiographyService] Autosave throttled, retry in {}ms",
                retry_after_ms
            );
            return Ok(AutosaveOutcome {
                autosave_at: Some(last_autosave_at),
                throttled: true,
            });
        }

        if !created && !patch.is_empty() {
            self.biographies.update(&current.id, &patch, now).await?;
        }
        self.sync_content(&current.id, &input.content).await?;
        self.biographies.touch_autosave(&current.id, now).await?;
        self.cache.invalidate(&current.slug).await;
        if created {
            self.announce_publish(None, &current).await;
        }

        Ok(AutosaveOutcome {
            autosave_at: Some(now),
            throttled: false,
        })
    }

    /// Deletes the caller's record and releases its images.
    ///
    /// # Errors
    ///
    /// `NotFound` when the caller has no record.
    pub async fn delete_my(&self, user_id: &str) -> Result<()> {
        let existing = self
            .biographies
            .find_by_user_id(user_id)
            .await?
            .ok_or_else(|| BiographyError::not_found("Biography", user_id))?;
        ensure_editable(&existing, user_id)?;

        let Some(images) = self.biographies.delete(&existing.id).await? else {
            return Err(BiographyError::not_found("Biography", &existing.id));
        };

        for url in images.urls() {
            if let Err(e) = self.media.release(url).await {
                tracing::warn!(
                    biography_id = %existing.id,
                    "[BiographyService] Failed to release {}: {}",
                    url,
                    e
                );
            }
        }

        self.cache.invalidate(&existing.slug).await;
        self.emit(BiographyEvent::Deleted {
            biography_id: existing.id.clone(),
            user_id: user_id.to_string(),
        })
        .await;
        tracing::info!(biography_id = %existing.id, user_id = %user_id, "[BiographyService] Deleted");
        Ok(())
    }

    async fn resolve_or_create(
        &self,
        user_id: &str,
        input: NormalizedInput,
        mode: SaveMode,
    ) -> Result<(Biography, bool)> {
        self.log_ignored(user_id, mode.name, &input.ignored);
        let patch = input.patch.restricted_to(mode.fields);

        if mode.requires_name && patch.name.as_deref().is_none_or(|n| n.trim().is_empty()) {
            return Err(BiographyError::validation("name is required"));
        }

        let now = self.clock.now();
        match self.biographies.find_by_user_id(user_id).await? {
            Some(existing) => {
                ensure_editable(&existing, user_id)?;
                let updated = if patch.is_empty() {
                    existing.clone()
                } else {
                    self.biographies.update(&existing.id, &patch, now).await?
                };
                self.sync_content(&updated.id, &input.content).await?;
                self.cache.invalidate(&existing.slug).await;
                self.announce_publish(Some(&existing), &updated).await;
                Ok((self.attach_one(updated).await?, false))
            }
            None => {
                let created = self
                    .create_for_owner(user_id, patch, mode.default_visibility)
                    .await?;
                self.sync_content(&created.id, &input.content).await?;
                self.cache.invalidate(&created.slug).await;
                self.announce_publish(None, &created).await;
                Ok((self.attach_one(created).await?, true))
            }
        }
    }

    /// First slug candidate not yet taken.
    async fn free_slug(&self, base: &str, id: &str) -> Result<String> {
        for candidate in slug_candidates(base, id) {
            if !self.biographies.slug_exists(&candidate).await? {
                return Ok(candidate);
            }
            tracing::debug!("[BiographyService] Slug '{}' is taken", candidate);
        }
        Err(BiographyError::conflict(format!("no free slug for '{base}'")))
    }

    /// Creates a record for `user_id`, synthesizing slug and display name
    /// from the owner profile.
    async fn create_for_owner(
        &self,
        user_id: &str,
        patch: BiographyPatch,
        default_visibility: Visibility,
    ) -> Result<Biography> {
        let owner = self.owners.find_profile(user_id).await?.ok_or_else(|| {
            BiographyError::dependency_inconsistency(format!(
                "user '{user_id}' has no resolvable profile"
            ))
        })?;

        let id = Uuid::new_v4().to_string();
        let base = normalize_slug(&owner.username);
        let slug = self.free_slug(&base, &id).await?;

        let new = NewBiography {
            id,
            user_id: user_id.to_string(),
            slug,
            name: resolve_display_name(patch.name.as_deref(), &owner, &self.display.fallback_name),
            visibility: patch.visibility.unwrap_or(default_visibility),
            fields: patch,
        };
        let created = self.biographies.create(&new, self.clock.now()).await?;
        tracing::info!(
            biography_id = %created.id,
            user_id = %user_id,
            slug = %created.slug,
            "[BiographyService] Created biography ({})",
            created.visibility
        );
        Ok(created)
    }

    async fn sync_content(&self, biography_id: &str, content: &ContentUpdate) -> Result<()> {
        if let Some(one_liners) = &content.one_liners {
            for skipped in &one_liners.skipped {
                tracing::warn!(biography_id = %biography_id, "[BiographyService] Skipped malformed one-liner '{}'", skipped);
            }
            self.content.sync_one_liners(biography_id, one_liners).await?;
        }
        if let Some(stories) = &content.stories {
            for skipped in &stories.skipped {
                tracing::warn!(biography_id = %biography_id, "[BiographyService] Skipped malformed story '{}'", skipped);
            }
            self.content.sync_stories(biography_id, stories).await?;
        }
        Ok(())
    }

    async fn attach_one(&self, biography: Biography) -> Result<Biography> {
        let mut attached = self.attach_content(vec![biography]).await?;
        attached
            .pop()
            .ok_or_else(|| BiographyError::internal("content attachment dropped a record"))
    }

    /// Loads story content for a batch of records with one query per table.
    async fn attach_content(&self, biographies: Vec<Biography>) -> Result<Vec<Biography>> {
        if biographies.is_empty() {
            return Ok(biographies);
        }
        let ids: Vec<String> = biographies.iter().map(|b| b.id.clone()).collect();
        let (mut one_liners, mut stories) = tokio::try_join!(
            self.content.batch_get_one_liners(&ids),
            self.content.batch_get_stories(&ids),
        )?;

        Ok(biographies
            .into_iter()
            .map(|bio| {
                let ol = one_liners.remove(&bio.id);
                let st = stories.remove(&bio.id);
                bio.with_content(ol, st)
            })
            .collect())
    }

    /// True when the stored record behind a cached `slug` may still be
    /// served as-is to `viewer`.
    async fn still_public(&self, slug: &str, viewer: &Viewer) -> Result<bool> {
        Ok(self
            .biographies
            .access_by_slug(slug)
            .await?
            .is_some_and(|access| {
                access.visibility == Visibility::Public
                    && can_view(access.visibility, access.owner_id.as_deref(), viewer)
            }))
    }

    fn mask(&self, biography: Biography, viewer: &Viewer) -> Biography {
        mask_for_viewer(biography, viewer, &self.display.anonymous_name)
    }

    /// Emits `Published` when `after` carries its first publish stamp.
    async fn announce_publish(&self, before: Option<&Biography>, after: &Biography) {
        let was_published = before.is_some_and(|b| b.published_at.is_some());
        if was_published || after.published_at.is_none() {
            return;
        }
        let Some(user_id) = after.owner_id() else {
            return;
        };
        tracing::info!(biography_id = %after.id, "[BiographyService] Published");
        self.emit(BiographyEvent::Published {
            biography_id: after.id.clone(),
            user_id: user_id.to_string(),
        })
        .await;
    }

    async fn emit(&self, event: BiographyEvent) {
        let name = event.name();
        if let Err(e) = self.events.publish(event).await {
            tracing::warn!("[BiographyService] Failed to publish {} event: {}", name, e);
        }
    }

    fn log_ignored(&self, user_id: &str, operation: &str, ignored: &[&'static str]) {
        for field in ignored {
            tracing::warn!(
                user_id = %user_id,
                "[BiographyService] {}: ignoring malformed '{}'",
                operation,
                field
            );
        }
    }
}

fn readable_by(biography: &Biography, viewer: &Viewer) -> bool {
    can_view(biography.visibility, biography.owner_id(), viewer)
}

fn ensure_editable(biography: &Biography, user_id: &str) -> Result<()> {
    if can_edit(biography.owner_id(), &Viewer::user(user_id)) {
        Ok(())
    } else {
        Err(BiographyError::forbidden(format!(
            "user '{user_id}' may not edit biography '{}'",
            biography.id
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(owner: Option<&str>, visibility: &str) -> Biography {
        serde_json::from_value(json!({
            "id": "b1", "user_id": owner, "slug": "alice", "name": "Alice",
            "title": null, "bio": null, "avatar_url": null, "cover_image": null,
            "achievements": null, "social_links": null, "tags_data": null,
            "basic_info_data": null, "youtube_channel_id": null, "featured_video_id": null,
            "is_featured": false, "visibility": visibility, "total_likes": 0,
            "total_views": 0, "follower_count": 0, "published_at": null, "autosave_at": null,
            "created_at": "2025-03-01T12:00:00Z", "updated_at": "2025-03-01T12:00:00Z"
        }))
        .unwrap()
    }

    #[test]
    fn test_only_owner_passes_edit_gate() {
        let bio = record(Some("u1"), "public");
        assert!(ensure_editable(&bio, "u1").is_ok());
        assert!(ensure_editable(&bio, "u2").unwrap_err().is_forbidden());
        assert!(ensure_editable(&record(None, "public"), "u1").is_err());
    }

    #[test]
    fn test_read_gate_follows_visibility() {
        let private = record(Some("u1"), "private");
        assert!(readable_by(&private, &Viewer::user("u1")));
        assert!(!readable_by(&private, &Viewer::user("u2")));
        assert!(!readable_by(&record(Some("u1"), "community"), &Viewer::guest()));
        assert!(readable_by(&record(Some("u1"), "anonymous"), &Viewer::guest()));
    }
}
