//! Repository for the `dashboards` and `dashboard_tags` tables.
//!
//! Saves run in a transaction that locks the target rows (`FOR UPDATE`)
//! before the conflict rules in [`check_save_conflicts`] are evaluated, so
//! two racing saves of the same dashboard cannot both pass the version check.

use chrono::Utc;
use kiosk_core::dashboard::{
    check_save_conflicts, DashboardDocument, SaveDashboardCommand, SavePlan,
};
use kiosk_core::error::{DashboardError, PortError};
use kiosk_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::dashboard::{
    DashboardHeaderRow, DashboardRow, TagCloudRow, DASHBOARD_COLUMNS,
};

/// Unique constraint guarding one slug per org.
const UQ_ORG_SLUG: &str = "uq_dashboards_org_slug";

/// Provides lookups and versioned saves for dashboards.
pub struct DashboardRepo;

impl DashboardRepo {
    // -----------------------------------------------------------------------
    // Lookups
    // -----------------------------------------------------------------------

    /// Find a dashboard by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<DashboardRow>, sqlx::Error> {
        let query = format!("SELECT {DASHBOARD_COLUMNS} FROM dashboards WHERE id = $1");
        sqlx::query_as::<_, DashboardRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a dashboard by its slug within an org.
    pub async fn find_by_slug(
        pool: &PgPool,
        org_id: DbId,
        slug: &str,
    ) -> Result<Option<DashboardRow>, sqlx::Error> {
        let query =
            format!("SELECT {DASHBOARD_COLUMNS} FROM dashboards WHERE org_id = $1 AND slug = $2");
        sqlx::query_as::<_, DashboardRow>(&query)
            .bind(org_id)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// Header of every stored dashboard among `ids`, ordered by id.
    pub async fn find_headers_by_ids(
        pool: &PgPool,
        ids: &[DbId],
    ) -> Result<Vec<DashboardHeaderRow>, sqlx::Error> {
        sqlx::query_as::<_, DashboardHeaderRow>(
            "SELECT id, title, slug, org_id, owner_user_id, is_private \
             FROM dashboards WHERE id = ANY($1) ORDER BY id",
        )
        .bind(ids)
        .fetch_all(pool)
        .await
    }

    /// Slug of a dashboard within an org, if it exists.
    pub async fn find_slug_by_id(
        pool: &PgPool,
        org_id: DbId,
        id: DbId,
    ) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>("SELECT slug FROM dashboards WHERE id = $1 AND org_id = $2")
            .bind(id)
            .bind(org_id)
            .fetch_optional(pool)
            .await
    }

    /// Dashboards installed by a plugin into an org, ordered by title.
    pub async fn list_by_plugin(
        pool: &PgPool,
        org_id: DbId,
        plugin_id: &str,
    ) -> Result<Vec<DashboardRow>, sqlx::Error> {
        let query = format!(
            "SELECT {DASHBOARD_COLUMNS} FROM dashboards \
             WHERE org_id = $1 AND plugin_id = $2 \
             ORDER BY title, id"
        );
        sqlx::query_as::<_, DashboardRow>(&query)
            .bind(org_id)
            .bind(plugin_id)
            .fetch_all(pool)
            .await
    }

    /// Tag usage counts across an org's dashboards, ordered by term.
    pub async fn tag_cloud(pool: &PgPool, org_id: DbId) -> Result<Vec<TagCloudRow>, sqlx::Error> {
        sqlx::query_as::<_, TagCloudRow>(
            "SELECT dt.term, COUNT(*) AS count \
             FROM dashboard_tags dt \
             JOIN dashboards d ON d.id = dt.dashboard_id \
             WHERE d.org_id = $1 \
             GROUP BY dt.term \
             ORDER BY dt.term",
        )
        .bind(org_id)
        .fetch_all(pool)
        .await
    }

    /// Delete a dashboard by slug. Returns `true` if a row was removed.
    pub async fn delete_by_slug(pool: &PgPool, org_id: DbId, slug: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM dashboards WHERE org_id = $1 AND slug = $2")
            .bind(org_id)
            .bind(slug)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Save
    // -----------------------------------------------------------------------

    /// Create or update a dashboard from a save command.
    ///
    /// New dashboards are stored at version 0; every update stores the
    /// previous version plus one. `created_by` and `created_at` are written
    /// only on insert.
    pub async fn save(
        pool: &PgPool,
        cmd: &SaveDashboardCommand,
    ) -> Result<DashboardDocument, DashboardError> {
        let mut dash = DashboardDocument::from_save_command(cmd);
        let mut tx = pool.begin().await.map_err(db_error)?;

        let existing_by_id = match dash.id {
            Some(id) => lock_by_id(&mut tx, dash.org_id, id).await?,
            None => None,
        };
        let existing_by_slug = lock_by_slug(&mut tx, dash.org_id, &dash.slug).await?;

        let plan = check_save_conflicts(
            &dash,
            existing_by_id.as_ref(),
            existing_by_slug.as_ref(),
            cmd.overwrite,
        )?;

        let id = match plan {
            SavePlan::Insert => {
                let id: DbId = sqlx::query_scalar(
                    "SELECT nextval(pg_get_serial_sequence('dashboards', 'id'))",
                )
                .fetch_one(&mut *tx)
                .await
                .map_err(db_error)?;
                dash.stamp_saved(id, 0);
                insert(&mut tx, &dash).await?;
                id
            }
            SavePlan::Update { id, stored_version } => {
                dash.stamp_saved(id, stored_version + 1);
                update(&mut tx, &dash).await?;
                id
            }
        };

        replace_tags(&mut tx, id, &dash.tags()).await?;

        let query = format!("SELECT {DASHBOARD_COLUMNS} FROM dashboards WHERE id = $1");
        let saved = sqlx::query_as::<_, DashboardRow>(&query)
            .bind(id)
            .fetch_one(&mut *tx)
            .await
            .map_err(db_error)?;

        tx.commit().await.map_err(db_error)?;

        tracing::info!(
            dashboard_id = saved.id,
            org_id = saved.org_id,
            version = saved.version,
            slug = %saved.slug,
            "Dashboard saved"
        );

        Ok(saved.into())
    }
}

// ---------------------------------------------------------------------------
// Save helpers (all run inside the save transaction)
// ---------------------------------------------------------------------------

async fn lock_by_id(
    conn: &mut PgConnection,
    org_id: DbId,
    id: DbId,
) -> Result<Option<DashboardDocument>, DashboardError> {
    let query = format!(
        "SELECT {DASHBOARD_COLUMNS} FROM dashboards WHERE id = $1 AND org_id = $2 FOR UPDATE"
    );
    let row = sqlx::query_as::<_, DashboardRow>(&query)
        .bind(id)
        .bind(org_id)
        .fetch_optional(conn)
        .await
        .map_err(db_error)?;
    Ok(row.map(Into::into))
}

async fn lock_by_slug(
    conn: &mut PgConnection,
    org_id: DbId,
    slug: &str,
) -> Result<Option<DashboardDocument>, DashboardError> {
    let query = format!(
        "SELECT {DASHBOARD_COLUMNS} FROM dashboards WHERE org_id = $1 AND slug = $2 FOR UPDATE"
    );
    let row = sqlx::query_as::<_, DashboardRow>(&query)
        .bind(org_id)
        .bind(slug)
        .fetch_optional(conn)
        .await
        .map_err(db_error)?;
    Ok(row.map(Into::into))
}

async fn insert(conn: &mut PgConnection, dash: &DashboardDocument) -> Result<(), DashboardError> {
    let now = Utc::now();
    sqlx::query(
        "INSERT INTO dashboards \
         (id, org_id, slug, title, version, gnet_id, plugin_id, owner_user_id, is_private, \
          created_by, updated_by, created_at, updated_at, data) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)",
    )
    .bind(dash.id)
    .bind(dash.org_id)
    .bind(&dash.slug)
    .bind(&dash.title)
    .bind(dash.version.unwrap_or(0))
    .bind(dash.gnet_id)
    .bind(&dash.plugin_id)
    .bind(dash.owner_user_id)
    .bind(dash.is_private)
    .bind(dash.created_by)
    .bind(dash.updated_by)
    .bind(dash.created_at.unwrap_or(now))
    .bind(dash.updated_at.unwrap_or(now))
    .bind(serde_json::Value::Object(dash.payload.clone()))
    .execute(conn)
    .await
    .map_err(db_error)?;
    Ok(())
}

async fn update(conn: &mut PgConnection, dash: &DashboardDocument) -> Result<(), DashboardError> {
    sqlx::query(
        "UPDATE dashboards SET \
            slug = $2, title = $3, version = $4, gnet_id = $5, plugin_id = $6, \
            owner_user_id = $7, is_private = $8, updated_by = $9, updated_at = $10, data = $11 \
         WHERE id = $1",
    )
    .bind(dash.id)
    .bind(&dash.slug)
    .bind(&dash.title)
    .bind(dash.version.unwrap_or(0))
    .bind(dash.gnet_id)
    .bind(&dash.plugin_id)
    .bind(dash.owner_user_id)
    .bind(dash.is_private)
    .bind(dash.updated_by)
    .bind(dash.updated_at.unwrap_or_else(Utc::now))
    .bind(serde_json::Value::Object(dash.payload.clone()))
    .execute(conn)
    .await
    .map_err(db_error)?;
    Ok(())
}

async fn replace_tags(
    conn: &mut PgConnection,
    dashboard_id: DbId,
    tags: &[String],
) -> Result<(), DashboardError> {
    sqlx::query("DELETE FROM dashboard_tags WHERE dashboard_id = $1")
        .bind(dashboard_id)
        .execute(&mut *conn)
        .await
        .map_err(db_error)?;

    if tags.is_empty() {
        return Ok(());
    }

    sqlx::query(
        "INSERT INTO dashboard_tags (dashboard_id, term) \
         SELECT $1, UNNEST($2::text[])",
    )
    .bind(dashboard_id)
    .bind(tags)
    .execute(&mut *conn)
    .await
    .map_err(db_error)?;
    Ok(())
}

/// Map a sqlx error from the save path into the domain taxonomy.
///
/// A unique violation on the org/slug constraint means another save created
/// the same name between our lock and our write.
fn db_error(err: sqlx::Error) -> DashboardError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23505") && db_err.constraint() == Some(UQ_ORG_SLUG) {
            return DashboardError::SameNameExists;
        }
    }
    DashboardError::Persistence(PortError::new(err.to_string()))
}
