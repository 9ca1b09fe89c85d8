//! PostgreSQL implementation of the `kiosk-core` ports.

use async_trait::async_trait;
use kiosk_core::dashboard::{DashboardDocument, DashboardHeader, SaveDashboardCommand};
use kiosk_core::error::{DashboardError, PortError};
use kiosk_core::playlist::PlaylistItemReference;
use kiosk_core::ports::{DashboardLookup, DashboardSearch, DashboardStore, PlaylistItemStore};
use kiosk_core::search::{SearchHit, SearchQuery};
use kiosk_core::types::DbId;

use crate::repositories::{DashboardRepo, DashboardSearchRepo, PlaylistRepo};
use crate::DbPool;

/// Every port backed by one connection pool.
#[derive(Clone)]
pub struct PgCatalog {
    pool: DbPool,
}

impl PgCatalog {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn port_error(err: sqlx::Error) -> PortError {
    PortError::new(err.to_string())
}

#[async_trait]
impl PlaylistItemStore for PgCatalog {
    async fn get_playlist_items(
        &self,
        playlist_id: DbId,
    ) -> Result<Vec<PlaylistItemReference>, PortError> {
        let rows = PlaylistRepo::list_items(&self.pool, playlist_id)
            .await
            .map_err(port_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl DashboardLookup for PgCatalog {
    async fn get_dashboards_by_ids(&self, ids: &[DbId]) -> Result<Vec<DashboardHeader>, PortError> {
        let rows = DashboardRepo::find_headers_by_ids(&self.pool, ids)
            .await
            .map_err(port_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get_dashboard_by_id(&self, id: DbId) -> Result<Option<DashboardDocument>, PortError> {
        let row = DashboardRepo::find_by_id(&self.pool, id)
            .await
            .map_err(port_error)?;
        Ok(row.map(Into::into))
    }
}

#[async_trait]
impl DashboardSearch for PgCatalog {
    async fn search(&self, query: SearchQuery) -> Result<Vec<SearchHit>, PortError> {
        let rows = DashboardSearchRepo::search(&self.pool, &query)
            .await
            .map_err(port_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl DashboardStore for PgCatalog {
    async fn save_dashboard(
        &self,
        cmd: SaveDashboardCommand,
    ) -> Result<DashboardDocument, DashboardError> {
        DashboardRepo::save(&self.pool, &cmd).await
    }
}
