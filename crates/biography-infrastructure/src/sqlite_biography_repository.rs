//! SQLite implementation of [`BiographyRepository`].

use crate::error::{db_error, is_unique_violation};
use crate::predicate::push_read_predicate;
use async_trait::async_trait;
use biography_core::biography::{
    Biography, BiographyPatch, BiographyQuery, BiographyRepository, NewBiography, RecordAccess,
    StoredImages,
};
use biography_core::{BiographyError, ReadPredicate, Result, Visibility};
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::str::FromStr;

const SELECT_BIOGRAPHY: &str = "SELECT \
    b.id, b.user_id, b.slug, b.name, b.title, b.bio, \
    COALESCE(b.avatar_url, u.avatar_url) AS avatar_url, \
    b.cover_image, b.achievements, b.social_links, b.tags_data, b.basic_info_data, \
    b.youtube_channel_id, b.featured_video_id, b.is_featured, b.visibility, \
    b.total_likes, b.total_views, b.follower_count, \
    b.published_at, b.autosave_at, b.created_at, b.updated_at, \
    u.username AS owner_username, u.display_name AS owner_display_name \
    FROM biographies b LEFT JOIN users u ON u.id = b.user_id";

#[derive(Debug, sqlx::FromRow)]
struct BiographyRow {
    id: String,
    user_id: Option<String>,
    slug: String,
    name: String,
    title: Option<String>,
    bio: Option<String>,
    avatar_url: Option<String>,
    cover_image: Option<String>,
    achievements: Option<String>,
    social_links: Option<String>,
    tags_data: Option<String>,
    basic_info_data: Option<String>,
    youtube_channel_id: Option<String>,
    featured_video_id: Option<String>,
    is_featured: bool,
    visibility: String,
    total_likes: i64,
    total_views: i64,
    follower_count: i64,
    published_at: Option<DateTime<Utc>>,
    autosave_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    owner_username: Option<String>,
    owner_display_name: Option<String>,
}

/// Parses a JSON column. A corrupt value is logged and read as absent.
fn parse_json_column(id: &str, column: &str, raw: Option<String>) -> Option<Value> {
    let raw = raw?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(biography_id = %id, "[BiographyRepository] Unreadable {} column: {}", column, e);
            None
        }
    }
}

fn parse_visibility(key: &str, raw: &str) -> Result<Visibility> {
    Visibility::from_str(raw).map_err(|_| {
        BiographyError::data_access(format!("biography {key} has unknown visibility '{raw}'"))
    })
}

impl TryFrom<BiographyRow> for Biography {
    type Error = BiographyError;

    fn try_from(row: BiographyRow) -> Result<Self> {
        let visibility = parse_visibility(&row.id, &row.visibility)?;
        let social_links = parse_json_column(&row.id, "social_links", row.social_links);
        let tags_data = parse_json_column(&row.id, "tags_data", row.tags_data);
        let basic_info_data = parse_json_column(&row.id, "basic_info_data", row.basic_info_data);

        Ok(Biography {
            id: row.id,
            user_id: row.user_id,
            slug: row.slug,
            name: row.name,
            title: row.title,
            bio: row.bio,
            avatar_url: row.avatar_url,
            cover_image: row.cover_image,
            achievements: row.achievements,
            social_links,
            tags_data,
            basic_info_data,
            youtube_channel_id: row.youtube_channel_id,
            featured_video_id: row.featured_video_id,
            is_featured: row.is_featured,
            visibility,
            total_likes: row.total_likes,
            total_views: row.total_views,
            follower_count: row.follower_count,
            published_at: row.published_at,
            autosave_at: row.autosave_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
            owner_username: row.owner_username,
            owner_display_name: row.owner_display_name,
            one_liners: None,
            stories: None,
        })
    }
}

fn json_text(value: &Option<Value>) -> Result<Option<String>> {
    value
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(BiographyError::from)
}

/// `%term%` with LIKE wildcards in the term escaped.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

/// Appends the listing filter shared by `find_many` and `count`.
fn push_listing_filter(
    builder: &mut QueryBuilder<'_, Sqlite>,
    query: &BiographyQuery,
    predicate: &ReadPredicate,
) {
    builder.push(" WHERE ");
    push_read_predicate(builder, predicate, "b");

    if let Some(featured) = query.featured {
        builder.push(" AND b.is_featured = ").push_bind(featured);
    }

    if let Some(term) = query.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        let pattern = like_pattern(term);
        builder
            .push(" AND (b.name LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR b.bio LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR b.slug LIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')");
    }
}

/// Biography storage backed by SQLite.
#[derive(Clone)]
pub struct SqliteBiographyRepository {
    pool: SqlitePool,
}

impl SqliteBiographyRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn fetch_unfiltered(&self, id: &str) -> Result<Option<Biography>> {
        let sql = format!("{SELECT_BIOGRAPHY} WHERE b.id = ?");
        let row: Option<BiographyRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;
        row.map(Biography::try_from).transpose()
    }

    async fn fetch_one_filtered(
        &self,
        column: &'static str,
        value: &str,
        predicate: &ReadPredicate,
    ) -> Result<Option<Biography>> {
        let mut builder = QueryBuilder::<Sqlite>::new(SELECT_BIOGRAPHY);
        builder
            .push(" WHERE b.")
            .push(column)
            .push(" = ")
            .push_bind(value.to_string())
            .push(" AND ");
        push_read_predicate(&mut builder, predicate, "b");

        let row: Option<BiographyRow> = builder
            .build_query_as()
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;
        row.map(Biography::try_from).transpose()
    }
}

#[async_trait]
impl BiographyRepository for SqliteBiographyRepository {
    async fn find_by_id(&self, id: &str, predicate: &ReadPredicate) -> Result<Option<Biography>> {
        self.fetch_one_filtered("id", id, predicate).await
    }

    async fn find_by_slug(
        &self,
        slug: &str,
        predicate: &ReadPredicate,
    ) -> Result<Option<Biography>> {
        self.fetch_one_filtered("slug", slug, predicate).await
    }

    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<Biography>> {
        let sql = format!("{SELECT_BIOGRAPHY} WHERE b.user_id = ?");
        let row: Option<BiographyRow> = sqlx::query_as(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;
        row.map(Biography::try_from).transpose()
    }

    async fn find_many(
        &self,
        query: &BiographyQuery,
        predicate: &ReadPredicate,
    ) -> Result<Vec<Biography>> {
        let mut builder = QueryBuilder::<Sqlite>::new(SELECT_BIOGRAPHY);
        push_listing_filter(&mut builder, query, predicate);
        builder
            .push(" ORDER BY b.created_at DESC, b.id DESC LIMIT ")
            .push_bind(i64::from(query.limit))
            .push(" OFFSET ")
            .push_bind(query.offset() as i64);

        let rows: Vec<BiographyRow> = builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;
        rows.into_iter().map(Biography::try_from).collect()
    }

    async fn count(&self, query: &BiographyQuery, predicate: &ReadPredicate) -> Result<u64> {
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM biographies b");
        push_listing_filter(&mut builder, query, predicate);

        let (count,): (i64,) = builder
            .build_query_as()
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(count.max(0) as u64)
    }

    async fn find_featured(&self, limit: u32) -> Result<Vec<Biography>> {
        let sql = format!(
            "{SELECT_BIOGRAPHY} WHERE b.visibility = ? AND b.is_featured = 1 \
             ORDER BY b.published_at DESC LIMIT ?"
        );
        let rows: Vec<BiographyRow> = sqlx::query_as(&sql)
            .bind(Visibility::Public.as_str())
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;
        rows.into_iter().map(Biography::try_from).collect()
    }

    async fn access_by_slug(&self, slug: &str) -> Result<Option<RecordAccess>> {
        let row: Option<(String, Option<String>)> =
            sqlx::query_as("SELECT visibility, user_id FROM biographies WHERE slug = ?")
                .bind(slug)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error)?;
        row.map(|(visibility, owner_id)| {
            Ok(RecordAccess {
                visibility: parse_visibility(slug, &visibility)?,
                owner_id,
            })
        })
        .transpose()
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool> {
        let found: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM biographies WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(found.is_some())
    }

    async fn create(&self, new: &NewBiography, now: DateTime<Utc>) -> Result<Biography> {
        let fields = &new.fields;
        let published_at = (new.visibility == Visibility::Public).then_some(now);

        let result = sqlx::query(
            "INSERT INTO biographies (\
                id, user_id, slug, name, title, bio, avatar_url, cover_image, achievements, \
                social_links, is_featured, visibility, tags_data, basic_info_data, \
                youtube_channel_id, featured_video_id, published_at, created_at, updated_at\
             ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&new.id)
        .bind(&new.user_id)
        .bind(&new.slug)
        .bind(&new.name)
        .bind(&fields.title)
        .bind(&fields.bio)
        .bind(&fields.avatar_url)
        .bind(&fields.cover_image)
        .bind(&fields.achievements)
        .bind(json_text(&fields.social_links)?)
        .bind(fields.is_featured.unwrap_or(false))
        .bind(new.visibility.as_str())
        .bind(json_text(&fields.tags_data)?)
        .bind(json_text(&fields.basic_info_data)?)
        .bind(&fields.youtube_channel_id)
        .bind(&fields.featured_video_id)
        .bind(published_at)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => {
                return Err(BiographyError::conflict(format!(
                    "biography for user '{}' or slug '{}' already exists",
                    new.user_id, new.slug
                )));
            }
            Err(e) => return Err(db_error(e)),
        }

        self.fetch_unfiltered(&new.id)
            .await?
            .ok_or_else(|| BiographyError::internal("failed to read back created biography"))
    }

    async fn update(
        &self,
        id: &str,
        patch: &BiographyPatch,
        now: DateTime<Utc>,
    ) -> Result<Biography> {
        if patch.is_empty() {
            return Err(BiographyError::validation("No fields to update"));
        }

        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let current: Option<(Option<DateTime<Utc>>, String)> =
            sqlx::query_as("SELECT published_at, visibility FROM biographies WHERE id = ?")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(db_error)?;
        let Some((published_at, current_visibility)) = current else {
            return Err(BiographyError::not_found("Biography", id));
        };

        let stamp_publish = patch.visibility == Some(Visibility::Public)
            && published_at.is_none()
            && current_visibility != Visibility::Public.as_str();

        let mut builder = QueryBuilder::<Sqlite>::new("UPDATE biographies SET ");
        let mut set = builder.separated(", ");
        if let Some(name) = &patch.name {
            set.push("name = ").push_bind_unseparated(name.clone());
        }
        if let Some(title) = &patch.title {
            set.push("title = ").push_bind_unseparated(title.clone());
        }
        if let Some(bio) = &patch.bio {
            set.push("bio = ").push_bind_unseparated(bio.clone());
        }
        if let Some(avatar_url) = &patch.avatar_url {
            set.push("avatar_url = ").push_bind_unseparated(avatar_url.clone());
        }
        if let Some(cover_image) = &patch.cover_image {
            set.push("cover_image = ").push_bind_unseparated(cover_image.clone());
        }
        if let Some(achievements) = &patch.achievements {
            set.push("achievements = ").push_bind_unseparated(achievements.clone());
        }
        if let Some(social_links) = json_text(&patch.social_links)? {
            set.push("social_links = ").push_bind_unseparated(social_links);
        }
        if let Some(is_featured) = patch.is_featured {
            set.push("is_featured = ").push_bind_unseparated(is_featured);
        }
        if let Some(visibility) = patch.visibility {
            set.push("visibility = ").push_bind_unseparated(visibility.as_str());
        }
        if let Some(tags_data) = json_text(&patch.tags_data)? {
            set.push("tags_data = ").push_bind_unseparated(tags_data);
        }
        if let Some(basic_info_data) = json_text(&patch.basic_info_data)? {
            set.push("basic_info_data = ").push_bind_unseparated(basic_info_data);
        }
        if let Some(channel) = &patch.youtube_channel_id {
            set.push("youtube_channel_id = ").push_bind_unseparated(channel.clone());
        }
        if let Some(video) = &patch.featured_video_id {
            set.push("featured_video_id = ").push_bind_unseparated(video.clone());
        }
        if stamp_publish {
            set.push("published_at = ").push_bind_unseparated(now);
        }
        set.push("updated_at = ").push_bind_unseparated(now);
        builder.push(" WHERE id = ").push_bind(id.to_string());

        builder
            .build()
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;
        tx.commit().await.map_err(db_error)?;

        if stamp_publish {
            tracing::info!(biography_id = %id, "[BiographyRepository] First publish stamped");
        }

        self.fetch_unfiltered(id)
            .await?
            .ok_or_else(|| BiographyError::not_found("Biography", id))
    }

    async fn touch_autosave(&self, id: &str, at: DateTime<Utc>) -> Result<()> {
        sqlx::query("UPDATE biographies SET autosave_at = ? WHERE id = ?")
            .bind(at)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<Option<StoredImages>> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let images: Option<(Option<String>, Option<String>)> =
            sqlx::query_as("SELECT avatar_url, cover_image FROM biographies WHERE id = ?")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(db_error)?;
        let Some((avatar_url, cover_image)) = images else {
            return Ok(None);
        };

        for table in [
            "biography_core_stories",
            "biography_one_liners",
            "biography_stories",
            "biography_likes",
            "biography_views",
        ] {
            let sql = format!("DELETE FROM {table} WHERE biography_id = ?");
            sqlx::query(&sql)
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(db_error)?;
        }

        sqlx::query("DELETE FROM biographies WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

        tx.commit().await.map_err(db_error)?;
        tracing::info!(biography_id = %id, "[BiographyRepository] Deleted biography");
        Ok(Some(StoredImages {
            avatar_url,
            cover_image,
        }))
    }
}
