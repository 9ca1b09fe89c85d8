//! Playlist and playlist item rows.

use kiosk_core::playlist::{ItemKind, Playlist, PlaylistItemReference};
use kiosk_core::types::{DbId, Timestamp};
use serde::Deserialize;
use sqlx::FromRow;

/// A row from the `playlists` table.
#[derive(Debug, Clone, FromRow)]
pub struct PlaylistRow {
    pub id: DbId,
    pub org_id: DbId,
    pub name: String,
    pub playback_interval: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<PlaylistRow> for Playlist {
    fn from(row: PlaylistRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            interval: row.playback_interval,
            org_id: row.org_id,
        }
    }
}

/// A row from the `playlist_items` table.
#[derive(Debug, Clone, FromRow)]
pub struct PlaylistItemRow {
    pub id: DbId,
    pub playlist_id: DbId,
    pub item_type: String,
    pub value: String,
    pub title: String,
    pub position: i32,
}

impl From<PlaylistItemRow> for PlaylistItemReference {
    fn from(row: PlaylistItemRow) -> Self {
        Self {
            id: row.id,
            playlist_id: row.playlist_id,
            kind: ItemKind::from(row.item_type),
            value: row.value,
            order: row.position,
            title: row.title,
        }
    }
}

/// DTO for creating a playlist together with its items.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePlaylist {
    pub org_id: DbId,
    pub name: String,
    pub interval: String,
    pub items: Vec<CreatePlaylistItem>,
}

/// One item of a [`CreatePlaylist`]; its position is its index in the list.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePlaylistItem {
    #[serde(rename = "type")]
    pub kind: ItemKind,
    pub value: String,
    #[serde(default)]
    pub title: String,
}
