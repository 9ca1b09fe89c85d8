#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use kiosk_core::dashboard::{DashboardDocument, SaveDashboardCommand};
use kiosk_db::models::playlist::{CreatePlaylist, CreatePlaylistItem};
use kiosk_db::repositories::{DashboardRepo, PlaylistRepo};
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

use kiosk_api::auth::jwt::{generate_access_token, JwtConfig};
use kiosk_api::config::ServerConfig;
use kiosk_api::router::build_app_router;
use kiosk_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults and a fixed JWT secret.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        tag_search_timeout_secs: 5,
        db_max_connections: 5,
        jwt: JwtConfig {
            secret: "integration-test-secret-long-enough".to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

/// Build the full application router over `pool`, with the same middleware
/// stack `main.rs` uses.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState::new(pool, config.clone());
    build_app_router(state, &config)
}

/// Bearer token for `user_id` acting in `org_id`.
pub fn token(user_id: i64, org_id: i64) -> String {
    generate_access_token(user_id, org_id, &test_config().jwt)
        .expect("token generation should succeed")
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.expect("request should complete")
}

pub async fn get(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn get_anonymous(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, token: &str, body: Value) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn delete(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be valid JSON")
}

// ---------------------------------------------------------------------------
// Seeding
// ---------------------------------------------------------------------------

pub async fn seed_dashboard(
    pool: &PgPool,
    org_id: i64,
    user_id: i64,
    dashboard: Value,
    plugin_id: &str,
) -> DashboardDocument {
    let Value::Object(dashboard) = dashboard else {
        panic!("dashboard payload must be an object");
    };
    let cmd = SaveDashboardCommand {
        dashboard,
        overwrite: false,
        is_private: false,
        org_id,
        plugin_id: plugin_id.to_string(),
        user_id,
    };
    DashboardRepo::save(pool, &cmd).await.unwrap()
}

pub async fn seed_playlist(
    pool: &PgPool,
    org_id: i64,
    name: &str,
    items: Vec<CreatePlaylistItem>,
) -> i64 {
    PlaylistRepo::create(
        pool,
        &CreatePlaylist {
            org_id,
            name: name.to_string(),
            interval: "5m".to_string(),
            items,
        },
    )
    .await
    .unwrap()
    .id
}
