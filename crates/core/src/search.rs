//! Dashboard search query shapes and limits.
//!
//! The search index itself is an external collaborator (see
//! [`crate::ports::DashboardSearch`]); this module only defines what is asked
//! of it and what comes back.

use serde::{Deserialize, Serialize};

use crate::types::DbId;

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

/// Maximum matches taken from the search index for a single playlist tag.
pub const TAG_SEARCH_LIMIT: i64 = 100;

/// Default playlist search page when the caller gives no (or a zero) limit.
pub const DEFAULT_PLAYLIST_SEARCH_LIMIT: i64 = 1000;

/// Upper bound for any dashboard search page.
pub const MAX_SEARCH_LIMIT: i64 = 5000;

// ---------------------------------------------------------------------------
// Query / result
// ---------------------------------------------------------------------------

/// A dashboard search scoped to one organization and user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Free-text title filter; empty matches every title.
    pub title: String,
    /// All listed tags must be present on a match.
    pub tags: Vec<String>,
    pub org_id: DbId,
    pub user_id: DbId,
    pub limit: i64,
    /// Restrict to dashboards the user has starred.
    pub starred_only: bool,
}

impl SearchQuery {
    /// The query issued for one tag reference of a playlist.
    pub fn for_tag(tag: &str, org_id: DbId, user_id: DbId) -> Self {
        Self {
            title: String::new(),
            tags: vec![tag.to_string()],
            org_id,
            user_id,
            limit: TAG_SEARCH_LIMIT,
            starred_only: false,
        }
    }
}

/// One dashboard returned by the search index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: DbId,
    pub title: String,
    pub slug: String,
    pub uri: String,
    pub tags: Vec<String>,
    pub is_starred: bool,
}

/// Clamp a user-provided limit, treating absent and zero as `default`.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    match limit {
        None | Some(0) => default,
        Some(n) => n.max(1).min(max),
    }
}
