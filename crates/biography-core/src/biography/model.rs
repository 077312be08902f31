//! Biography aggregate root and its write/query shapes.

use crate::content::{ContentUpdate, JsonPayload, OneLiners, OneLinersInput, Stories, StoriesInput};
use crate::visibility::Visibility;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The user-authored profile aggregate root.
///
/// `avatar_url` already carries the owner's avatar as a fallback when the
/// biography has none. `owner_username` / `owner_display_name` come from the
/// owning user's profile row and are empty for unowned records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Biography {
    pub id: String,
    pub user_id: Option<String>,
    pub slug: String,
    pub name: String,
    pub title: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub cover_image: Option<String>,
    pub achievements: Option<String>,
    pub social_links: Option<Value>,
    pub tags_data: Option<Value>,
    pub basic_info_data: Option<Value>,
    pub youtube_channel_id: Option<String>,
    pub featured_video_id: Option<String>,
    pub is_featured: bool,
    pub visibility: Visibility,
    pub total_likes: i64,
    pub total_views: i64,
    pub follower_count: i64,
    pub published_at: Option<DateTime<Utc>>,
    pub autosave_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_display_name: Option<String>,
    #[serde(rename = "one_liners_data", default)]
    pub one_liners: Option<OneLiners>,
    #[serde(rename = "stories_data", default)]
    pub stories: Option<Stories>,
}

impl Biography {
    pub fn owner_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    /// Attaches aggregated content. Empty maps are exposed as absent.
    pub fn with_content(mut self, one_liners: Option<OneLiners>, stories: Option<Stories>) -> Self {
        self.one_liners = one_liners.filter(|m| !m.is_empty());
        self.stories = stories.filter(|m| !m.is_empty());
        self
    }
}

/// Column values for a new biography row.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBiography {
    pub id: String,
    pub user_id: String,
    pub slug: String,
    pub name: String,
    pub visibility: Visibility,
    /// Remaining column values. `visibility` inside the patch is ignored.
    pub fields: BiographyPatch,
}

/// Column-level fields accepted by writes.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::AsRefStr,
    strum::Display,
    strum::EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum BiographyField {
    Name,
    Title,
    Bio,
    AvatarUrl,
    CoverImage,
    Achievements,
    SocialLinks,
    IsFeatured,
    Visibility,
    TagsData,
    BasicInfoData,
    YoutubeChannelId,
    FeaturedVideoId,
}

impl BiographyField {
    /// Fields an explicit create-or-update may write.
    pub const FULL_SAVE: &'static [BiographyField] = &[
        BiographyField::Name,
        BiographyField::Title,
        BiographyField::Bio,
        BiographyField::AvatarUrl,
        BiographyField::CoverImage,
        BiographyField::Achievements,
        BiographyField::SocialLinks,
        BiographyField::IsFeatured,
        BiographyField::Visibility,
        BiographyField::TagsData,
        BiographyField::BasicInfoData,
        BiographyField::YoutubeChannelId,
        BiographyField::FeaturedVideoId,
    ];

    /// Fields the profile editor may write. No featuring, no video channel.
    pub const EDITOR: &'static [BiographyField] = &[
        BiographyField::Name,
        BiographyField::Title,
        BiographyField::Bio,
        BiographyField::AvatarUrl,
        BiographyField::CoverImage,
        BiographyField::Achievements,
        BiographyField::SocialLinks,
        BiographyField::Visibility,
        BiographyField::TagsData,
        BiographyField::BasicInfoData,
    ];

    /// Columns a throttled autosave may write.
    pub const AUTOSAVE: &'static [BiographyField] =
        &[BiographyField::TagsData, BiographyField::BasicInfoData];
}

/// A partial column update. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BiographyPatch {
    pub name: Option<String>,
    pub title: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub cover_image: Option<String>,
    pub achievements: Option<String>,
    pub social_links: Option<Value>,
    pub is_featured: Option<bool>,
    pub visibility: Option<Visibility>,
    pub tags_data: Option<Value>,
    pub basic_info_data: Option<Value>,
    pub youtube_channel_id: Option<String>,
    pub featured_video_id: Option<String>,
}

impl BiographyPatch {
    /// Fields this patch sets.
    pub fn fields(&self) -> Vec<BiographyField> {
        use BiographyField as F;
        let present = [
            (F::Name, self.name.is_some()),
            (F::Title, self.title.is_some()),
            (F::Bio, self.bio.is_some()),
            (F::AvatarUrl, self.avatar_url.is_some()),
            (F::CoverImage, self.cover_image.is_some()),
            (F::Achievements, self.achievements.is_some()),
            (F::SocialLinks, self.social_links.is_some()),
            (F::IsFeatured, self.is_featured.is_some()),
            (F::Visibility, self.visibility.is_some()),
            (F::TagsData, self.tags_data.is_some()),
            (F::BasicInfoData, self.basic_info_data.is_some()),
            (F::YoutubeChannelId, self.youtube_channel_id.is_some()),
            (F::FeaturedVideoId, self.featured_video_id.is_some()),
        ];
        present
            .into_iter()
            .filter_map(|(field, set)| set.then_some(field))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }

    /// Drops every field not in `allowed`.
    pub fn restricted_to(mut self, allowed: &[BiographyField]) -> Self {
        use BiographyField as F;
        for field in self.fields() {
            if allowed.contains(&field) {
                continue;
            }
            match field {
                F::Name => self.name = None,
                F::Title => self.title = None,
                F::Bio => self.bio = None,
                F::AvatarUrl => self.avatar_url = None,
                F::CoverImage => self.cover_image = None,
                F::Achievements => self.achievements = None,
                F::SocialLinks => self.social_links = None,
                F::IsFeatured => self.is_featured = None,
                F::Visibility => self.visibility = None,
                F::TagsData => self.tags_data = None,
                F::BasicInfoData => self.basic_info_data = None,
                F::YoutubeChannelId => self.youtube_channel_id = None,
                F::FeaturedVideoId => self.featured_video_id = None,
            }
        }
        self
    }
}

/// Body of a biography write as received from clients.
///
/// JSON columns and story blobs are accepted either as a JSON string or as
/// an already-parsed value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BiographyInput {
    pub name: Option<String>,
    pub title: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub cover_image: Option<String>,
    pub achievements: Option<String>,
    pub social_links: Option<JsonPayload>,
    pub is_featured: Option<bool>,
    pub visibility: Option<Visibility>,
    pub tags_data: Option<JsonPayload>,
    pub basic_info_data: Option<JsonPayload>,
    pub youtube_channel_id: Option<String>,
    pub featured_video_id: Option<String>,
    pub one_liners_data: Option<JsonPayload>,
    pub stories_data: Option<JsonPayload>,
}

/// [`BiographyInput`] after boundary normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedInput {
    pub patch: BiographyPatch,
    pub content: ContentUpdate,
    /// Top-level fields that were present but malformed and therefore ignored.
    pub ignored: Vec<&'static str>,
}

impl BiographyInput {
    /// Parse-if-string normalization of every JSON-shaped field.
    ///
    /// A malformed field is dropped and reported in `ignored`; the rest of
    /// the input still applies.
    pub fn normalize(self) -> NormalizedInput {
        let mut ignored = Vec::new();

        let mut document = |name: &'static str, payload: Option<JsonPayload>| {
            let payload = payload?;
            let value = payload.into_document();
            if value.is_none() {
                ignored.push(name);
            }
            value
        };
        let social_links = document("social_links", self.social_links);
        let tags_data = document("tags_data", self.tags_data);
        let basic_info_data = document("basic_info_data", self.basic_info_data);

        let one_liners = self.one_liners_data.and_then(|payload| {
            let parsed = OneLinersInput::from_payload(payload);
            if parsed.is_none() {
                ignored.push("one_liners_data");
            }
            parsed
        });
        let stories = self.stories_data.and_then(|payload| {
            let parsed = StoriesInput::from_payload(payload);
            if parsed.is_none() {
                ignored.push("stories_data");
            }
            parsed
        });

        NormalizedInput {
            patch: BiographyPatch {
                name: self.name,
                title: self.title,
                bio: self.bio,
                avatar_url: self.avatar_url,
                cover_image: self.cover_image,
                achievements: self.achievements,
                social_links,
                is_featured: self.is_featured,
                visibility: self.visibility,
                tags_data,
                basic_info_data,
                youtube_channel_id: self.youtube_channel_id,
                featured_video_id: self.featured_video_id,
            },
            content: ContentUpdate {
                one_liners,
                stories,
            },
            ignored,
        }
    }
}

/// Listing filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BiographyQuery {
    /// 1-based page number.
    pub page: u32,
    pub limit: u32,
    pub featured: Option<bool>,
    /// Case-insensitive substring matched against name, bio and slug.
    pub search: Option<String>,
}

impl BiographyQuery {
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u64,
}

impl Pagination {
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        let total_pages = if limit == 0 {
            0
        } else {
            total.div_ceil(u64::from(limit))
        };
        Self {
            page,
            limit,
            total,
            total_pages,
        }
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

/// The access-relevant columns of a biography row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordAccess {
    pub visibility: Visibility,
    pub owner_id: Option<String>,
}

/// Image references stored on a biography row, without owner fallbacks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredImages {
    pub avatar_url: Option<String>,
    pub cover_image: Option<String>,
}

impl StoredImages {
    pub fn urls(&self) -> impl Iterator<Item = &str> {
        [self.avatar_url.as_deref(), self.cover_image.as_deref()]
            .into_iter()
            .flatten()
            .filter(|url| !url.trim().is_empty())
    }
}

/// Profile attributes of a user, used to synthesize defaults on first save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerProfile {
    pub id: String,
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}
