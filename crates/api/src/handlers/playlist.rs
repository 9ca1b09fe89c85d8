//! Handlers for playlists: search, detail, items and dashboard resolution.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use kiosk_core::error::CoreError;
use kiosk_core::playlist::{Playlist, PlaylistItemReference};
use kiosk_core::search::{clamp_limit, DEFAULT_PLAYLIST_SEARCH_LIMIT, MAX_SEARCH_LIMIT};
use kiosk_core::types::{DbId, NO_ORG};
use kiosk_db::repositories::PlaylistRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::SearchPlaylistsParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// A playlist together with its ordered items.
#[derive(Debug, Serialize)]
pub struct PlaylistDetail {
    #[serde(flatten)]
    pub playlist: Playlist,
    pub items: Vec<PlaylistItemReference>,
}

/* --------------------------------------------------------------------------
Helpers
-------------------------------------------------------------------------- */

/// Fetch a playlist the caller's org may see.
///
/// A missing playlist, or one stored without an org, is reported as 404; a
/// playlist of another org as 403.
async fn ensure_org_playlist(pool: &sqlx::PgPool, org_id: DbId, id: DbId) -> AppResult<Playlist> {
    let playlist: Playlist = PlaylistRepo::find_by_id(pool, id)
        .await?
        .filter(|p| p.org_id != NO_ORG)
        .map(Into::into)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Playlist",
            id,
        }))?;

    if playlist.org_id != org_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "You are not allowed to edit/view playlist".into(),
        )));
    }

    Ok(playlist)
}

async fn load_items(pool: &sqlx::PgPool, id: DbId) -> AppResult<Vec<PlaylistItemReference>> {
    let rows = PlaylistRepo::list_items(pool, id).await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

/* --------------------------------------------------------------------------
Endpoints
-------------------------------------------------------------------------- */

/// GET /playlists?query=&limit=
///
/// Playlists of the caller's org whose name contains `query`.
pub async fn search_playlists(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<SearchPlaylistsParams>,
) -> AppResult<impl IntoResponse> {
    let limit = clamp_limit(params.limit, DEFAULT_PLAYLIST_SEARCH_LIMIT, MAX_SEARCH_LIMIT);

    let playlists: Vec<Playlist> =
        PlaylistRepo::search(&state.pool, auth.org_id, params.query.trim(), limit)
            .await?
            .into_iter()
            .map(Into::into)
            .collect();

    Ok(Json(DataResponse { data: playlists }))
}

/// GET /playlists/{id}
pub async fn get_playlist(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let playlist = ensure_org_playlist(&state.pool, auth.org_id, id).await?;
    let items = load_items(&state.pool, id).await?;

    Ok(Json(DataResponse {
        data: PlaylistDetail { playlist, items },
    }))
}

/// GET /playlists/{id}/items
pub async fn get_playlist_items(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_org_playlist(&state.pool, auth.org_id, id).await?;
    let items = load_items(&state.pool, id).await?;

    Ok(Json(DataResponse { data: items }))
}

/// GET /playlists/{id}/dashboards
///
/// Resolve every item into dashboard summaries: id references first, then
/// tag matches, then literal URIs.
pub async fn get_playlist_dashboards(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_org_playlist(&state.pool, auth.org_id, id).await?;

    let dashboards = state
        .resolver
        .resolve_playlist_dashboards(auth.org_id, auth.user_id, id)
        .await
        .map_err(|err| {
            tracing::error!(playlist_id = id, error = %err, "Playlist resolution failed");
            AppError::from(err)
        })?;

    tracing::debug!(
        playlist_id = id,
        user_id = auth.user_id,
        count = dashboards.len(),
        "Playlist resolved"
    );

    Ok(Json(DataResponse { data: dashboards }))
}
