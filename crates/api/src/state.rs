use std::sync::Arc;

use kiosk_core::ports::{DashboardLookup, DashboardStore};
use kiosk_core::resolver::PlaylistResolver;
use kiosk_db::catalog::PgCatalog;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything is behind an `Arc` or already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: kiosk_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Playlist resolver wired to the PostgreSQL ports.
    pub resolver: PlaylistResolver,
    /// Dashboard lookups by id.
    pub lookup: Arc<dyn DashboardLookup>,
    /// Versioned dashboard saves.
    pub dashboards: Arc<dyn DashboardStore>,
}

impl AppState {
    /// Wire every port to one [`PgCatalog`] over `pool`.
    pub fn new(pool: kiosk_db::DbPool, config: ServerConfig) -> Self {
        let catalog = Arc::new(PgCatalog::new(pool.clone()));
        let resolver = PlaylistResolver::new(catalog.clone(), catalog.clone(), catalog.clone())
            .with_tag_search_timeout(config.tag_search_timeout());

        Self {
            pool,
            config: Arc::new(config),
            resolver,
            lookup: catalog.clone(),
            dashboards: catalog,
        }
    }
}
