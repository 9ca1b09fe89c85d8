//! Playlist item references and the summaries they resolve to.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::DbId;

// ---------------------------------------------------------------------------
// Item kinds
// ---------------------------------------------------------------------------

/// Stored kind string for a direct dashboard id reference.
pub const KIND_DASHBOARD_BY_ID: &str = "dashboard_by_id";

/// Stored kind string for a literal dashboard URI reference.
pub const KIND_DASHBOARD_BY_URI: &str = "dashboard_by_uri";

/// Stored kind string for a tag query reference.
pub const KIND_DASHBOARD_BY_TAG: &str = "dashboard_by_tag";

/// What a playlist item points at.
///
/// Kinds this version does not know about are kept as [`ItemKind::Unknown`]
/// so newer rows still load; the classifier ignores them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ItemKind {
    ById,
    ByUri,
    ByTag,
    Unknown(String),
}

impl ItemKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::ById => KIND_DASHBOARD_BY_ID,
            Self::ByUri => KIND_DASHBOARD_BY_URI,
            Self::ByTag => KIND_DASHBOARD_BY_TAG,
            Self::Unknown(raw) => raw,
        }
    }
}

impl From<&str> for ItemKind {
    fn from(raw: &str) -> Self {
        match raw {
            KIND_DASHBOARD_BY_ID => Self::ById,
            KIND_DASHBOARD_BY_URI => Self::ByUri,
            KIND_DASHBOARD_BY_TAG => Self::ByTag,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl From<String> for ItemKind {
    fn from(raw: String) -> Self {
        Self::from(raw.as_str())
    }
}

impl From<ItemKind> for String {
    fn from(kind: ItemKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// References and summaries
// ---------------------------------------------------------------------------

/// One stored entry of a playlist.
///
/// `order` is the stored position; it is not comparable across kinds once
/// the playlist has been classified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistItemReference {
    pub id: DbId,
    pub playlist_id: DbId,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    pub value: String,
    pub order: i32,
    pub title: String,
}

impl PlaylistItemReference {
    /// Build a reference that has not been stored yet.
    pub fn new(kind: ItemKind, value: impl Into<String>, order: i32) -> Self {
        Self {
            id: 0,
            playlist_id: 0,
            kind,
            value: value.into(),
            order,
            title: String::new(),
        }
    }
}

/// Display-ready projection of a dashboard inside a resolved playlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummary {
    /// `0` for literal-uri entries.
    pub id: DbId,
    pub title: String,
    pub slug: String,
    pub uri: String,
}

/// A playlist header as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: DbId,
    pub name: String,
    /// Playback interval, e.g. `"5m"`.
    pub interval: String,
    pub org_id: DbId,
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Playlist references split by kind, each bucket in playlist order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifiedReferences {
    pub ids: Vec<DbId>,
    pub uris: Vec<String>,
    pub tags: Vec<String>,
}

impl ClassifiedReferences {
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty() && self.uris.is_empty() && self.tags.is_empty()
    }
}

/// Partition references into id, uri and tag buckets.
///
/// Relative order inside each bucket follows the input. Unknown kinds are
/// skipped, and so are id references whose value is not an integer.
pub fn classify_references(items: &[PlaylistItemReference]) -> ClassifiedReferences {
    let mut classified = ClassifiedReferences::default();

    for item in items {
        match &item.kind {
            ItemKind::ById => match item.value.trim().parse::<DbId>() {
                Ok(id) => classified.ids.push(id),
                Err(_) => {
                    tracing::warn!(
                        item_id = item.id,
                        value = %item.value,
                        "Skipping playlist item with non-numeric dashboard id"
                    );
                }
            },
            ItemKind::ByUri => classified.uris.push(item.value.clone()),
            ItemKind::ByTag => classified.tags.push(item.value.clone()),
            ItemKind::Unknown(kind) => {
                tracing::debug!(item_id = item.id, %kind, "Ignoring unknown playlist item kind");
            }
        }
    }

    classified
}
