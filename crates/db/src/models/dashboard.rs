//! Dashboard rows.

use kiosk_core::dashboard::{DashboardDocument, DashboardHeader, Payload, TagCloudItem};
use kiosk_core::search::SearchHit;
use kiosk_core::slug::dashboard_uri;
use kiosk_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// Column list for `dashboards` queries.
pub const DASHBOARD_COLUMNS: &str = "\
    id, org_id, slug, title, version, gnet_id, plugin_id, owner_user_id, \
    is_private, created_by, updated_by, created_at, updated_at, data";

/// A row from the `dashboards` table.
#[derive(Debug, Clone, FromRow)]
pub struct DashboardRow {
    pub id: DbId,
    pub org_id: DbId,
    pub slug: String,
    pub title: String,
    pub version: i32,
    pub gnet_id: DbId,
    pub plugin_id: String,
    pub owner_user_id: DbId,
    pub is_private: bool,
    pub created_by: Option<DbId>,
    pub updated_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub data: serde_json::Value,
}

impl From<DashboardRow> for DashboardDocument {
    fn from(row: DashboardRow) -> Self {
        let payload = match row.data {
            serde_json::Value::Object(map) => map,
            _ => Payload::new(),
        };

        let mut dash = DashboardDocument {
            id: None,
            org_id: row.org_id,
            gnet_id: row.gnet_id,
            owner_user_id: row.owner_user_id,
            plugin_id: row.plugin_id,
            title: row.title,
            slug: row.slug,
            version: None,
            is_private: row.is_private,
            created_by: row.created_by,
            updated_by: row.updated_by,
            created_at: Some(row.created_at),
            updated_at: Some(row.updated_at),
            payload,
        };
        dash.stamp_saved(row.id, row.version);
        dash
    }
}

/// Projection used by playlist resolution: display fields plus what the
/// resolver needs to check visibility.
#[derive(Debug, Clone, FromRow)]
pub struct DashboardHeaderRow {
    pub id: DbId,
    pub title: String,
    pub slug: String,
    pub org_id: DbId,
    pub owner_user_id: DbId,
    pub is_private: bool,
}

impl From<DashboardHeaderRow> for DashboardHeader {
    fn from(row: DashboardHeaderRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            slug: row.slug,
            org_id: row.org_id,
            owner_user_id: row.owner_user_id,
            is_private: row.is_private,
        }
    }
}

/// A dashboard search match.
#[derive(Debug, Clone, FromRow)]
pub struct SearchHitRow {
    pub id: DbId,
    pub title: String,
    pub slug: String,
    pub tags: Vec<String>,
    pub is_starred: bool,
}

impl From<SearchHitRow> for SearchHit {
    fn from(row: SearchHitRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            uri: dashboard_uri(&row.slug),
            slug: row.slug,
            tags: row.tags,
            is_starred: row.is_starred,
        }
    }
}

/// Per-term tag usage within an org.
#[derive(Debug, Clone, FromRow)]
pub struct TagCloudRow {
    pub term: String,
    pub count: i64,
}

impl From<TagCloudRow> for TagCloudItem {
    fn from(row: TagCloudRow) -> Self {
        Self {
            term: row.term,
            count: row.count,
        }
    }
}
