//! Repository for the `playlists` and `playlist_items` tables.

use sqlx::PgPool;
use kiosk_core::types::DbId;

use crate::models::playlist::{CreatePlaylist, PlaylistItemRow, PlaylistRow};

/// Column list for `playlists` queries.
const COLUMNS: &str = "id, org_id, name, playback_interval, created_at, updated_at";

/// Column list for `playlist_items` queries.
const ITEM_COLUMNS: &str = "id, playlist_id, item_type, value, title, position";

/// Read access to playlists, plus creation for seeding and imports.
pub struct PlaylistRepo;

impl PlaylistRepo {
    /// Find a playlist by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<PlaylistRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM playlists WHERE id = $1");
        sqlx::query_as::<_, PlaylistRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Playlists of an org whose name contains `name` (case-insensitive),
    /// ordered by name.
    pub async fn search(
        pool: &PgPool,
        org_id: DbId,
        name: &str,
        limit: i64,
    ) -> Result<Vec<PlaylistRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM playlists \
             WHERE org_id = $1 AND ($2 = '' OR name ILIKE '%' || $2 || '%') \
             ORDER BY name, id \
             LIMIT $3"
        );
        sqlx::query_as::<_, PlaylistRow>(&query)
            .bind(org_id)
            .bind(name)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Items of a playlist in stored order.
    pub async fn list_items(
        pool: &PgPool,
        playlist_id: DbId,
    ) -> Result<Vec<PlaylistItemRow>, sqlx::Error> {
        let query = format!(
            "SELECT {ITEM_COLUMNS} FROM playlist_items \
             WHERE playlist_id = $1 \
             ORDER BY position, id"
        );
        sqlx::query_as::<_, PlaylistItemRow>(&query)
            .bind(playlist_id)
            .fetch_all(pool)
            .await
    }

    /// Insert a playlist and its items in one transaction.
    ///
    /// Item positions are assigned from their index in `input.items`, starting at 1.
    pub async fn create(pool: &PgPool, input: &CreatePlaylist) -> Result<PlaylistRow, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO playlists (org_id, name, playback_interval) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        let playlist = sqlx::query_as::<_, PlaylistRow>(&query)
            .bind(input.org_id)
            .bind(&input.name)
            .bind(&input.interval)
            .fetch_one(&mut *tx)
            .await?;

        for (index, item) in input.items.iter().enumerate() {
            sqlx::query(
                "INSERT INTO playlist_items (playlist_id, item_type, value, title, position) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(playlist.id)
            .bind(item.kind.as_str())
            .bind(&item.value)
            .bind(&item.title)
            .bind(index as i32 + 1)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(playlist)
    }
}
