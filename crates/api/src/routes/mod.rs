pub mod dashboard;
pub mod health;
pub mod playlist;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /playlists                                 search (?query=&limit=)
/// /playlists/{id}                            playlist with items
/// /playlists/{id}/items                      ordered items
/// /playlists/{id}/dashboards                 resolved dashboard summaries
///
/// /dashboards                                save (POST)
/// /dashboards/tags                           tag cloud
/// /dashboards/id/{id}                        document by id
/// /dashboards/id/{id}/slug                   slug by id
/// /dashboards/db/{slug}                      get, delete
///
/// /plugins/{plugin_id}/dashboards            dashboards installed by a plugin
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/playlists", playlist::router())
        .nest("/dashboards", dashboard::router())
        .nest("/plugins", dashboard::plugin_router())
}
