//! Display transforms applied after access has been decided.

use super::model::{Biography, OwnerProfile};
use crate::visibility::{Viewer, Visibility};
use once_cell::sync::Lazy;
use regex::Regex;

static UUID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$")
        .expect("uuid pattern is valid")
});

static SLUG_INVALID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^a-z0-9]+").expect("slug pattern is valid")
});

/// How a path identifier should be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identifier<'a> {
    Id(&'a str),
    Slug(&'a str),
}

impl<'a> Identifier<'a> {
    /// Ids are UUIDs; anything else is a slug.
    pub fn parse(raw: &'a str) -> Self {
        if UUID_PATTERN.is_match(raw) {
            Self::Id(raw)
        } else {
            Self::Slug(raw)
        }
    }
}

/// Hides identity fields of an `anonymous` record from everyone but its owner.
///
/// Content fields are left untouched. Must only be applied to a record the
/// viewer is already allowed to read.
pub fn mask_for_viewer(mut biography: Biography, viewer: &Viewer, placeholder: &str) -> Biography {
    if biography.visibility != Visibility::Anonymous || viewer.owns(biography.owner_id()) {
        return biography;
    }
    biography.name = placeholder.to_string();
    biography.user_id = None;
    biography.avatar_url = None;
    biography.owner_username = None;
    biography.owner_display_name = None;
    biography
}

/// Lowercase kebab-case slug from a username. Empty when nothing usable remains.
pub fn normalize_slug(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    SLUG_INVALID
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

/// Suffix lengths tried in turn once the bare slug is taken.
const SLUG_SUFFIX_LENGTHS: [usize; 3] = [6, 8, 12];

/// Appends up to `len` alphanumerics of the new record id to a taken slug.
pub fn disambiguate_slug(base: &str, id: &str, len: usize) -> String {
    let suffix: String = id
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(len)
        .collect::<String>()
        .to_lowercase();
    if base.is_empty() {
        suffix
    } else {
        format!("{base}-{suffix}")
    }
}

/// Slugs to try for a new record, most preferred first. The last candidate
/// carries the whole id.
pub fn slug_candidates<'a>(base: &'a str, id: &'a str) -> impl Iterator<Item = String> + 'a {
    let bare = (!base.is_empty()).then(|| base.to_string());
    let suffixed = SLUG_SUFFIX_LENGTHS
        .into_iter()
        .chain([usize::MAX])
        .map(move |len| disambiguate_slug(base, id, len));
    bare.into_iter().chain(suffixed)
}

/// Display-name fallback chain: explicit name, profile display name, handle, generic fallback.
pub fn resolve_display_name(
    explicit: Option<&str>,
    owner: &OwnerProfile,
    fallback: &str,
) -> String {
    [
        explicit,
        owner.display_name.as_deref(),
        Some(owner.username.as_str()),
    ]
    .into_iter()
    .flatten()
    .map(str::trim)
    .find(|name| !name.is_empty())
    .unwrap_or(fallback)
    .to_string()
}
