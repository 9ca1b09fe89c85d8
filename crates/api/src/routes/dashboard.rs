//! Route definitions for dashboards.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::dashboard;
use crate::state::AppState;

/// Dashboard routes, registered as `/dashboards`.
///
/// ```text
/// POST   /                    save_dashboard
/// GET    /tags                get_tag_cloud
/// GET    /id/{id}             get_dashboard_by_id
/// GET    /id/{id}/slug        get_dashboard_slug
/// GET    /db/{slug}           get_dashboard_by_slug
/// DELETE /db/{slug}           delete_dashboard
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(dashboard::save_dashboard))
        .route("/tags", get(dashboard::get_tag_cloud))
        .route("/id/{id}", get(dashboard::get_dashboard_by_id))
        .route("/id/{id}/slug", get(dashboard::get_dashboard_slug))
        .route(
            "/db/{slug}",
            get(dashboard::get_dashboard_by_slug).delete(dashboard::delete_dashboard),
        )
}

/// Plugin-scoped dashboard listing, registered as `/plugins`.
pub fn plugin_router() -> Router<AppState> {
    Router::new().route(
        "/{plugin_id}/dashboards",
        get(dashboard::list_plugin_dashboards),
    )
}
