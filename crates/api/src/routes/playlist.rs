//! Route definitions for playlists.
//!
//! Registered under `/playlists`.

use axum::routing::get;
use axum::Router;

use crate::handlers::playlist;
use crate::state::AppState;

/// ```text
/// GET    /                    search_playlists
/// GET    /{id}                get_playlist
/// GET    /{id}/items          get_playlist_items
/// GET    /{id}/dashboards     get_playlist_dashboards
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(playlist::search_playlists))
        .route("/{id}", get(playlist::get_playlist))
        .route("/{id}/items", get(playlist::get_playlist_items))
        .route("/{id}/dashboards", get(playlist::get_playlist_dashboards))
}
