//! Dashboard search over titles, tags and stars.
//!
//! Matches are ranked by title. Private dashboards are only visible to
//! their owner.

use kiosk_core::search::SearchQuery;
use sqlx::PgPool;

use crate::models::dashboard::SearchHitRow;

/// Runs [`SearchQuery`]s against the `dashboards` table.
pub struct DashboardSearchRepo;

impl DashboardSearchRepo {
    /// Dashboards of `query.org_id` carrying every tag in `query.tags`.
    pub async fn search(pool: &PgPool, query: &SearchQuery) -> Result<Vec<SearchHitRow>, sqlx::Error> {
        sqlx::query_as::<_, SearchHitRow>(
            "SELECT d.id, d.title, d.slug, \
                    COALESCE(array_agg(dt.term ORDER BY dt.term) FILTER (WHERE dt.term IS NOT NULL), \
                             '{}'::text[]) AS tags, \
                    EXISTS (SELECT 1 FROM stars s \
                            WHERE s.dashboard_id = d.id AND s.user_id = $2) AS is_starred \
             FROM dashboards d \
             LEFT JOIN dashboard_tags dt ON dt.dashboard_id = d.id \
             WHERE d.org_id = $1 \
               AND (d.is_private = FALSE OR d.owner_user_id = $2) \
               AND ($3 = '' OR d.title ILIKE '%' || $3 || '%') \
               AND (NOT $4 OR EXISTS (SELECT 1 FROM stars s \
                                      WHERE s.dashboard_id = d.id AND s.user_id = $2)) \
             GROUP BY d.id \
             HAVING COALESCE(array_agg(dt.term) FILTER (WHERE dt.term IS NOT NULL), \
                             '{}'::text[]) @> $5::text[] \
             ORDER BY d.title, d.id \
             LIMIT $6",
        )
        .bind(query.org_id)
        .bind(query.user_id)
        .bind(&query.title)
        .bind(query.starred_only)
        .bind(&query.tags)
        .bind(query.limit)
        .fetch_all(pool)
        .await
    }
}
