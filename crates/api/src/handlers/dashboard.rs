//! Handlers for dashboard documents: versioned saves and org-scoped reads.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use kiosk_core::dashboard::{DashboardDocument, SaveDashboardCommand, TagCloudItem};
use kiosk_core::error::CoreError;
use kiosk_core::types::DbId;
use kiosk_db::repositories::DashboardRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Outcome of a successful save.
#[derive(Debug, Serialize)]
pub struct SavedDashboard {
    pub id: DbId,
    pub slug: String,
    pub version: i32,
    pub uri: String,
}

#[derive(Debug, Serialize)]
pub struct DashboardSlug {
    pub slug: String,
}

/* --------------------------------------------------------------------------
Helpers
-------------------------------------------------------------------------- */

/// Reject private dashboards owned by someone else.
fn ensure_visible(dash: &DashboardDocument, auth: &AuthUser) -> AppResult<()> {
    if dash.is_private && dash.owner_user_id != auth.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "The dashboard is owned by another user".into(),
        )));
    }
    Ok(())
}

/// Require a non-blank string `title` in a save payload.
fn ensure_title(cmd: &SaveDashboardCommand) -> AppResult<()> {
    match cmd.dashboard.get("title") {
        Some(Value::String(title)) if !title.trim().is_empty() => Ok(()),
        Some(Value::String(_)) | Some(Value::Null) | None => Err(AppError::BadRequest(
            "Dashboard title cannot be empty".into(),
        )),
        Some(_) => Err(AppError::BadRequest(
            "Dashboard title must be a string".into(),
        )),
    }
}

async fn ensure_dashboard_by_slug(
    pool: &sqlx::PgPool,
    org_id: DbId,
    slug: &str,
) -> AppResult<DashboardDocument> {
    DashboardRepo::find_by_slug(pool, org_id, slug)
        .await?
        .map(Into::into)
        .ok_or_else(|| AppError::NotFound(format!("Dashboard with slug '{slug}' not found")))
}

/* --------------------------------------------------------------------------
Save
-------------------------------------------------------------------------- */

/// POST /dashboards
///
/// Create or update a dashboard. The org and user come from the caller's
/// token; the body carries the payload plus `overwrite` / `is_private`.
pub async fn save_dashboard(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(mut cmd): Json<SaveDashboardCommand>,
) -> AppResult<impl IntoResponse> {
    cmd.org_id = auth.org_id;
    cmd.user_id = auth.user_id;
    ensure_title(&cmd)?;

    let is_new = cmd.dashboard.get("id").map_or(true, |v| v.is_null());

    let saved = state.dashboards.save_dashboard(cmd).await.map_err(|err| {
        tracing::warn!(user_id = auth.user_id, error = %err, "Dashboard save rejected");
        AppError::from(err)
    })?;

    let id = saved
        .id
        .ok_or_else(|| AppError::InternalError("Saved dashboard has no id".into()))?;
    let body = SavedDashboard {
        id,
        uri: saved.uri(),
        version: saved.version.unwrap_or(0),
        slug: saved.slug,
    };

    let status = if is_new {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(DataResponse { data: body })))
}

/* --------------------------------------------------------------------------
Reads
-------------------------------------------------------------------------- */

/// GET /dashboards/id/{id}
pub async fn get_dashboard_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let dash = state
        .lookup
        .get_dashboard_by_id(id)
        .await
        .map_err(|err| AppError::InternalError(err.to_string()))?
        .filter(|d| d.org_id == auth.org_id)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Dashboard",
            id,
        }))?;
    ensure_visible(&dash, &auth)?;

    Ok(Json(DataResponse { data: dash }))
}

/// GET /dashboards/id/{id}/slug
pub async fn get_dashboard_slug(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let slug = DashboardRepo::find_slug_by_id(&state.pool, auth.org_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Dashboard",
            id,
        }))?;

    Ok(Json(DataResponse {
        data: DashboardSlug { slug },
    }))
}

/// GET /dashboards/db/{slug}
pub async fn get_dashboard_by_slug(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    let dash = ensure_dashboard_by_slug(&state.pool, auth.org_id, &slug).await?;
    ensure_visible(&dash, &auth)?;

    Ok(Json(DataResponse { data: dash }))
}

/// DELETE /dashboards/db/{slug}
pub async fn delete_dashboard(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    let dash = ensure_dashboard_by_slug(&state.pool, auth.org_id, &slug).await?;
    ensure_visible(&dash, &auth)?;

    if !dash.plugin_id.is_empty() {
        return Err(AppError::Core(CoreError::Forbidden(format!(
            "Dashboard belongs to plugin {}",
            dash.plugin_id
        ))));
    }

    DashboardRepo::delete_by_slug(&state.pool, auth.org_id, &slug).await?;

    tracing::info!(
        user_id = auth.user_id,
        org_id = auth.org_id,
        dashboard_id = dash.id,
        slug = %slug,
        "Dashboard deleted"
    );

    Ok(StatusCode::NO_CONTENT)
}

/// GET /dashboards/tags
pub async fn get_tag_cloud(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let tags: Vec<TagCloudItem> = DashboardRepo::tag_cloud(&state.pool, auth.org_id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(DataResponse { data: tags }))
}

/// GET /plugins/{plugin_id}/dashboards
pub async fn list_plugin_dashboards(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(plugin_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let dashboards: Vec<DashboardDocument> =
        DashboardRepo::list_by_plugin(&state.pool, auth.org_id, &plugin_id)
            .await?
            .into_iter()
            .map(Into::into)
            .collect();

    Ok(Json(DataResponse { data: dashboards }))
}
