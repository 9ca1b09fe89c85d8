//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Query parameters for `GET /playlists` (`?query=&limit=`).
///
/// A missing or zero `limit` falls back to the default page size; clamping
/// happens in the handler via `clamp_limit`.
#[derive(Debug, Default, Deserialize)]
pub struct SearchPlaylistsParams {
    #[serde(default)]
    pub query: String,
    pub limit: Option<i64>,
}
