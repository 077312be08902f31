//! Read-access model for biographies.
//!
//! # Levels
//!
//! | Level | Readable by |
//! |-------|-------------|
//! | `public` | anyone; the only level counted by community-wide aggregates |
//! | `anonymous` | anyone, with identity fields masked for non-owners |
//! | `community` | any signed-in viewer |
//! | `private` | the owner only |
//!
//! [`ReadPredicate`] is the single source of these rules. List queries,
//! single-record lookups and related-record lookups all derive their filter
//! from it, and the storage layer renders it with bound parameters only.

use serde::{Deserialize, Serialize};

/// Exposure level of a biography. Wire values are lowercase and case-sensitive.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::AsRefStr,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Visibility {
    Private,
    Anonymous,
    Community,
    Public,
}

impl Visibility {
    /// The wire / column representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Private => "private",
            Visibility::Anonymous => "anonymous",
            Visibility::Community => "community",
            Visibility::Public => "public",
        }
    }
}

/// The identity reading a record: a concrete principal or nobody.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Viewer(Option<String>);

impl Viewer {
    /// A viewer with no authenticated identity.
    pub fn guest() -> Self {
        Self(None)
    }

    /// An authenticated viewer.
    pub fn user(id: impl Into<String>) -> Self {
        Self(Some(id.into()))
    }

    pub fn id(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.0.is_some()
    }

    /// Returns true when this viewer owns a record with the given owner id.
    pub fn owns(&self, owner_id: Option<&str>) -> bool {
        matches!((self.id(), owner_id), (Some(viewer), Some(owner)) if viewer == owner)
    }
}

impl From<Option<String>> for Viewer {
    fn from(id: Option<String>) -> Self {
        Self(id)
    }
}

/// Read-access filter derived from a [`Viewer`].
///
/// The predicate is data, not query text: storage backends ask it which
/// levels are readable unconditionally and which level is readable only by
/// its owner, and bind the viewer id as a parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadPredicate {
    /// No viewer: `public` and `anonymous` rows only.
    Guest,
    /// Signed-in viewer: everything but other owners' `private` rows.
    Principal { viewer_id: String },
}

const GUEST_LEVELS: &[Visibility] = &[Visibility::Public, Visibility::Anonymous];
const PRINCIPAL_LEVELS: &[Visibility] = &[
    Visibility::Public,
    Visibility::Anonymous,
    Visibility::Community,
];

impl ReadPredicate {
    pub fn for_viewer(viewer: &Viewer) -> Self {
        match viewer.id() {
            Some(id) => Self::Principal {
                viewer_id: id.to_string(),
            },
            None => Self::Guest,
        }
    }

    /// Levels readable regardless of ownership.
    pub fn open_levels(&self) -> &'static [Visibility] {
        match self {
            Self::Guest => GUEST_LEVELS,
            Self::Principal { .. } => PRINCIPAL_LEVELS,
        }
    }

    /// The owner id that unlocks `private` rows, if any.
    pub fn private_owner(&self) -> Option<&str> {
        match self {
            Self::Guest => None,
            Self::Principal { viewer_id } => Some(viewer_id),
        }
    }

    /// Evaluates the predicate against one row.
    pub fn allows(&self, visibility: Visibility, owner_id: Option<&str>) -> bool {
        if self.open_levels().contains(&visibility) {
            return true;
        }
        match (visibility, self.private_owner(), owner_id) {
            (Visibility::Private, Some(viewer), Some(owner)) => viewer == owner,
            _ => false,
        }
    }
}

/// Returns true when `viewer` may read a record with this visibility and owner.
///
/// The owner may always read their own record.
pub fn can_view(visibility: Visibility, owner_id: Option<&str>, viewer: &Viewer) -> bool {
    if viewer.owns(owner_id) {
        return true;
    }
    ReadPredicate::for_viewer(viewer).allows(visibility, owner_id)
}

/// Only the owner may edit a record.
pub fn can_edit(owner_id: Option<&str>, viewer: &Viewer) -> bool {
    viewer.owns(owner_id)
}
