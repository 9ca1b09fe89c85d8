//! Collaborator interfaces the core depends on.
//!
//! Each port is an object-safe async trait so the resolver can hold
//! `Arc<dyn ...>` handles. `kiosk-db` implements all of them on top of
//! PostgreSQL; tests implement them in memory.

use async_trait::async_trait;

use crate::dashboard::{DashboardDocument, DashboardHeader, SaveDashboardCommand};
use crate::error::{DashboardError, PortError};
use crate::playlist::PlaylistItemReference;
use crate::search::{SearchHit, SearchQuery};
use crate::types::DbId;

/// Source of a playlist's stored items.
#[async_trait]
pub trait PlaylistItemStore: Send + Sync {
    /// Items of `playlist_id` in stored order. An unknown playlist yields an
    /// empty list.
    async fn get_playlist_items(
        &self,
        playlist_id: DbId,
    ) -> Result<Vec<PlaylistItemReference>, PortError>;
}

/// Direct dashboard lookups.
#[async_trait]
pub trait DashboardLookup: Send + Sync {
    /// One row per stored dashboard among `ids`. Missing ids are simply absent.
    async fn get_dashboards_by_ids(&self, ids: &[DbId]) -> Result<Vec<DashboardHeader>, PortError>;

    async fn get_dashboard_by_id(&self, id: DbId) -> Result<Option<DashboardDocument>, PortError>;
}

/// The dashboard search index.
#[async_trait]
pub trait DashboardSearch: Send + Sync {
    async fn search(&self, query: SearchQuery) -> Result<Vec<SearchHit>, PortError>;
}

/// Dashboard persistence.
#[async_trait]
pub trait DashboardStore: Send + Sync {
    /// Validate and persist a save command, returning the stored document with
    /// its assigned id and version.
    async fn save_dashboard(
        &self,
        cmd: SaveDashboardCommand,
    ) -> Result<DashboardDocument, DashboardError>;
}
