//! Playlist resolution: stored references in, ordered dashboard summaries out.
//!
//! Pipeline:
//!
//! ```text
//! items --classify--> ids  --one batch lookup------> summaries ─┐
//!                     tags --one search per tag-----> summaries ─┼─ merge (id, tag, uri)
//!                     uris --no lookup--------------> summaries ─┘
//! ```
//!
//! The id lookup is all-or-nothing. A failed or timed-out tag search drops
//! only that tag's matches. The merged list is never deduplicated, and the
//! bucket order ignores where items sat in the playlist.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;

use crate::dashboard::DashboardHeader;
use crate::error::ResolveError;
use crate::playlist::{classify_references, DashboardSummary};
use crate::ports::{DashboardLookup, DashboardSearch, PlaylistItemStore};
use crate::search::SearchQuery;
use crate::slug::dashboard_uri;
use crate::types::DbId;

/// Default upper bound for a single tag search.
pub const DEFAULT_TAG_SEARCH_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Bucket resolvers
// ---------------------------------------------------------------------------

/// Resolve direct id references with a single batch lookup.
///
/// Each distinct id is looked up once. The output has one summary per input
/// occurrence of a found id, in input order, so a dashboard listed twice
/// plays twice. Ids with no stored dashboard are skipped, as are dashboards
/// of another org and other users' private dashboards.
pub async fn resolve_by_ids(
    lookup: &dyn DashboardLookup,
    ids: &[DbId],
    org_id: DbId,
    user_id: DbId,
) -> Result<Vec<DashboardSummary>, ResolveError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut seen = HashSet::with_capacity(ids.len());
    let distinct: Vec<DbId> = ids.iter().copied().filter(|id| seen.insert(*id)).collect();

    let rows = lookup
        .get_dashboards_by_ids(&distinct)
        .await
        .map_err(ResolveError::ReferenceLookupFailed)?;

    let by_id: HashMap<DbId, DashboardHeader> = rows
        .into_iter()
        .filter(|row| {
            let visible = row.visible_to(org_id, user_id);
            if !visible {
                tracing::debug!(
                    dashboard_id = row.id,
                    org_id,
                    "Skipping dashboard not visible to caller"
                );
            }
            visible
        })
        .map(|row| (row.id, row))
        .collect();

    Ok(ids
        .iter()
        .filter_map(|id| by_id.get(id))
        .map(|row| DashboardSummary {
            id: row.id,
            title: row.title.clone(),
            slug: row.slug.clone(),
            uri: dashboard_uri(&row.slug),
        })
        .collect())
}

/// Literal URI references become summaries without any lookup.
pub fn resolve_by_uris(uris: &[String]) -> Vec<DashboardSummary> {
    uris.iter()
        .map(|uri| DashboardSummary {
            id: 0,
            title: String::new(),
            slug: String::new(),
            uri: uri.clone(),
        })
        .collect()
}

/// Resolve tag references with one independent search per tag.
///
/// Searches run concurrently. Results are concatenated in tag order, each
/// tag's matches in the order the index returned them. A search that fails
/// or exceeds `timeout` contributes nothing.
pub async fn resolve_by_tags(
    search: &dyn DashboardSearch,
    tags: &[String],
    org_id: DbId,
    user_id: DbId,
    timeout: Duration,
) -> Vec<DashboardSummary> {
    if tags.is_empty() {
        return Vec::new();
    }

    let searches = tags.iter().map(|tag| async move {
        let query = SearchQuery::for_tag(tag, org_id, user_id);
        match tokio::time::timeout(timeout, search.search(query)).await {
            Ok(Ok(hits)) => hits,
            Ok(Err(err)) => {
                tracing::warn!(tag = %tag, org_id, error = %err, "Tag search failed, skipping tag");
                Vec::new()
            }
            Err(_) => {
                tracing::warn!(
                    tag = %tag,
                    org_id,
                    timeout_ms = timeout.as_millis() as u64,
                    "Tag search timed out, skipping tag"
                );
                Vec::new()
            }
        }
    });

    // join_all yields results in input order regardless of completion order.
    join_all(searches)
        .await
        .into_iter()
        .flatten()
        .map(|hit| DashboardSummary {
            id: hit.id,
            title: hit.title,
            slug: hit.slug,
            uri: hit.uri,
        })
        .collect()
}

/// Concatenate bucket results: ids first, then tag matches, then literal URIs.
pub fn merge(
    by_id: Vec<DashboardSummary>,
    by_tag: Vec<DashboardSummary>,
    by_uri: Vec<DashboardSummary>,
) -> Vec<DashboardSummary> {
    let mut merged = Vec::with_capacity(by_id.len() + by_tag.len() + by_uri.len());
    merged.extend(by_id);
    merged.extend(by_tag);
    merged.extend(by_uri);
    merged
}

// ---------------------------------------------------------------------------
// PlaylistResolver
// ---------------------------------------------------------------------------

/// Resolves playlists into dashboard summaries through injected ports.
///
/// Cheap to clone; holds only `Arc` handles.
#[derive(Clone)]
pub struct PlaylistResolver {
    items: Arc<dyn PlaylistItemStore>,
    lookup: Arc<dyn DashboardLookup>,
    search: Arc<dyn DashboardSearch>,
    tag_search_timeout: Duration,
}

impl PlaylistResolver {
    pub fn new(
        items: Arc<dyn PlaylistItemStore>,
        lookup: Arc<dyn DashboardLookup>,
        search: Arc<dyn DashboardSearch>,
    ) -> Self {
        Self {
            items,
            lookup,
            search,
            tag_search_timeout: DEFAULT_TAG_SEARCH_TIMEOUT,
        }
    }

    /// Override the per-tag search timeout.
    pub fn with_tag_search_timeout(mut self, timeout: Duration) -> Self {
        self.tag_search_timeout = timeout;
        self
    }

    /// Resolve `playlist_id` for a user of `org_id`.
    pub async fn resolve_playlist_dashboards(
        &self,
        org_id: DbId,
        user_id: DbId,
        playlist_id: DbId,
    ) -> Result<Vec<DashboardSummary>, ResolveError> {
        let items = self
            .items
            .get_playlist_items(playlist_id)
            .await
            .map_err(|source| ResolveError::ItemsUnavailable {
                playlist_id,
                source,
            })?;

        let classified = classify_references(&items);

        let (by_id, by_tag) = tokio::join!(
            resolve_by_ids(self.lookup.as_ref(), &classified.ids, org_id, user_id),
            resolve_by_tags(
                self.search.as_ref(),
                &classified.tags,
                org_id,
                user_id,
                self.tag_search_timeout,
            ),
        );
        let by_id = by_id?;
        let by_uri = resolve_by_uris(&classified.uris);

        tracing::debug!(
            playlist_id,
            by_id = by_id.len(),
            by_tag = by_tag.len(),
            by_uri = by_uri.len(),
            "Resolved playlist dashboards"
        );

        Ok(merge(by_id, by_tag, by_uri))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use assert_matches::assert_matches;
    use async_trait::async_trait;

    use super::*;
    use crate::dashboard::DashboardDocument;
    use crate::error::PortError;
    use crate::playlist::{ItemKind, PlaylistItemReference};
    use crate::search::SearchHit;

    // -- fakes ---------------------------------------------------------------

    #[derive(Default)]
    struct FakeItems {
        items: Vec<PlaylistItemReference>,
        fail: bool,
    }

    #[async_trait]
    impl PlaylistItemStore for FakeItems {
        async fn get_playlist_items(
            &self,
            _playlist_id: DbId,
        ) -> Result<Vec<PlaylistItemReference>, PortError> {
            if self.fail {
                return Err(PortError::new("items table unavailable"));
            }
            Ok(self.items.clone())
        }
    }

    #[derive(Default)]
    struct FakeLookup {
        dashboards: Vec<DashboardHeader>,
        fail: bool,
        calls: AtomicUsize,
        requested: Mutex<Vec<Vec<DbId>>>,
    }

    #[async_trait]
    impl DashboardLookup for FakeLookup {
        async fn get_dashboards_by_ids(
            &self,
            ids: &[DbId],
        ) -> Result<Vec<DashboardHeader>, PortError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requested.lock().unwrap().push(ids.to_vec());
            if self.fail {
                return Err(PortError::new("lookup failed"));
            }
            Ok(self
                .dashboards
                .iter()
                .filter(|d| ids.contains(&d.id))
                .cloned()
                .collect())
        }

        async fn get_dashboard_by_id(
            &self,
            _id: DbId,
        ) -> Result<Option<DashboardDocument>, PortError> {
            Ok(None)
        }
    }

    #[derive(Default)]
    struct FakeSearch {
        /// tag -> hits
        hits: HashMap<String, Vec<SearchHit>>,
        failing: HashSet<String>,
        slow: HashSet<String>,
        queries: Mutex<Vec<SearchQuery>>,
    }

    #[async_trait]
    impl DashboardSearch for FakeSearch {
        async fn search(&self, query: SearchQuery) -> Result<Vec<SearchHit>, PortError> {
            self.queries.lock().unwrap().push(query.clone());
            let tag = query.tags[0].clone();
            if self.slow.contains(&tag) {
                tokio::time::sleep(Duration::from_secs(60)).await;
            }
            if self.failing.contains(&tag) {
                return Err(PortError::new(format!("index error for {tag}")));
            }
            Ok(self.hits.get(&tag).cloned().unwrap_or_default())
        }
    }

    // -- helpers -------------------------------------------------------------

    fn header(id: DbId, title: &str) -> DashboardHeader {
        DashboardHeader {
            id,
            title: title.to_string(),
            slug: crate::slug::generate_slug(title),
            org_id: 1,
            owner_user_id: 1,
            is_private: false,
        }
    }

    fn hit(id: DbId, title: &str) -> SearchHit {
        let slug = crate::slug::generate_slug(title);
        SearchHit {
            id,
            title: title.to_string(),
            uri: dashboard_uri(&slug),
            slug,
            tags: Vec::new(),
            is_starred: false,
        }
    }

    fn by_id(value: &str) -> PlaylistItemReference {
        PlaylistItemReference::new(ItemKind::ById, value, 0)
    }

    fn by_uri(value: &str) -> PlaylistItemReference {
        PlaylistItemReference::new(ItemKind::ByUri, value, 0)
    }

    fn by_tag(value: &str) -> PlaylistItemReference {
        PlaylistItemReference::new(ItemKind::ByTag, value, 0)
    }

    fn resolver(
        items: FakeItems,
        lookup: Arc<FakeLookup>,
        search: Arc<FakeSearch>,
    ) -> PlaylistResolver {
        PlaylistResolver::new(Arc::new(items), lookup, search)
    }

    fn uris(summaries: &[DashboardSummary]) -> Vec<&str> {
        summaries.iter().map(|s| s.uri.as_str()).collect()
    }

    // -- bucket resolvers ----------------------------------------------------

    #[tokio::test]
    async fn empty_ids_make_no_lookup_call() {
        let lookup = FakeLookup::default();
        let result = resolve_by_ids(&lookup, &[], 1, 1).await.unwrap();
        assert!(result.is_empty());
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn ids_resolve_with_one_batch_call() {
        let lookup = FakeLookup {
            dashboards: vec![header(1, "Alpha"), header(2, "Beta")],
            ..Default::default()
        };
        let result = resolve_by_ids(&lookup, &[2, 1, 404], 1, 1).await.unwrap();

        assert_eq!(lookup.calls.load(Ordering::SeqCst), 1);
        assert_eq!(uris(&result), vec!["db/beta", "db/alpha"]);
        assert_eq!(result[0].id, 2);
        assert_eq!(result[0].title, "Beta");
        assert_eq!(result[0].slug, "beta");
    }

    #[tokio::test]
    async fn duplicate_ids_are_looked_up_once_but_kept() {
        let lookup = FakeLookup {
            dashboards: vec![header(5, "Five")],
            ..Default::default()
        };
        let result = resolve_by_ids(&lookup, &[5, 5], 1, 1).await.unwrap();

        assert_eq!(lookup.requested.lock().unwrap()[0], vec![5]);
        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn ids_of_other_orgs_and_private_dashboards_are_skipped() {
        let foreign = DashboardHeader {
            org_id: 2,
            ..header(2, "Foreign")
        };
        let private = DashboardHeader {
            owner_user_id: 9,
            is_private: true,
            ..header(3, "Private")
        };
        let mine = DashboardHeader {
            is_private: true,
            ..header(4, "Mine")
        };
        let lookup = FakeLookup {
            dashboards: vec![header(1, "Alpha"), foreign, private, mine],
            ..Default::default()
        };
        let result = resolve_by_ids(&lookup, &[1, 2, 3, 4], 1, 1).await.unwrap();

        assert_eq!(uris(&result), vec!["db/alpha", "db/mine"]);
    }

    #[tokio::test]
    async fn lookup_failure_is_fatal() {
        let lookup = FakeLookup {
            fail: true,
            ..Default::default()
        };
        assert_matches!(
            resolve_by_ids(&lookup, &[1], 1, 1).await,
            Err(ResolveError::ReferenceLookupFailed(_))
        );
    }

    #[test]
    fn uris_pass_through_verbatim() {
        let result = resolve_by_uris(&["db/x".to_string(), "dashboard/script/a.js".to_string()]);
        assert_eq!(uris(&result), vec!["db/x", "dashboard/script/a.js"]);
        assert!(result.iter().all(|s| s.id == 0 && s.title.is_empty() && s.slug.is_empty()));
    }

    #[tokio::test]
    async fn tag_queries_are_scoped_and_limited() {
        let search = FakeSearch::default();
        resolve_by_tags(&search, &["ops".into()], 3, 9, DEFAULT_TAG_SEARCH_TIMEOUT).await;

        let queries = search.queries.lock().unwrap();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0], SearchQuery::for_tag("ops", 3, 9));
    }

    #[tokio::test]
    async fn failing_tag_is_skipped() {
        let search = FakeSearch {
            hits: HashMap::from([("good".to_string(), vec![hit(1, "One"), hit(2, "Two")])]),
            failing: HashSet::from(["bad".to_string()]),
            ..Default::default()
        };
        let result = resolve_by_tags(
            &search,
            &["bad".into(), "good".into()],
            1,
            1,
            DEFAULT_TAG_SEARCH_TIMEOUT,
        )
        .await;
        assert_eq!(uris(&result), vec!["db/one", "db/two"]);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_tag_times_out_without_blocking_others() {
        let search = FakeSearch {
            hits: HashMap::from([
                ("slow".to_string(), vec![hit(1, "Never")]),
                ("fast".to_string(), vec![hit(2, "Quick")]),
            ]),
            slow: HashSet::from(["slow".to_string()]),
            ..Default::default()
        };
        let result = resolve_by_tags(
            &search,
            &["slow".into(), "fast".into()],
            1,
            1,
            Duration::from_millis(50),
        )
        .await;
        assert_eq!(uris(&result), vec!["db/quick"]);
    }

    #[tokio::test]
    async fn tag_results_follow_tag_order_without_dedup() {
        let search = FakeSearch {
            hits: HashMap::from([
                ("a".to_string(), vec![hit(1, "One"), hit(2, "Two")]),
                ("b".to_string(), vec![hit(2, "Two"), hit(3, "Three")]),
            ]),
            ..Default::default()
        };
        let result = resolve_by_tags(
            &search,
            &["b".into(), "a".into()],
            1,
            1,
            DEFAULT_TAG_SEARCH_TIMEOUT,
        )
        .await;
        assert_eq!(
            uris(&result),
            vec!["db/two", "db/three", "db/one", "db/two"]
        );
    }

    // -- full pipeline -------------------------------------------------------

    #[tokio::test]
    async fn buckets_merge_as_id_tag_uri_regardless_of_playlist_order() {
        let items = FakeItems {
            items: vec![by_uri("x"), by_tag("a"), by_id("5")],
            ..Default::default()
        };
        let lookup = Arc::new(FakeLookup {
            dashboards: vec![header(5, "Five")],
            ..Default::default()
        });
        let search = Arc::new(FakeSearch {
            hits: HashMap::from([("a".to_string(), vec![hit(7, "Seven")])]),
            ..Default::default()
        });

        let result = resolver(items, lookup, search)
            .resolve_playlist_dashboards(1, 1, 10)
            .await
            .unwrap();

        assert_eq!(uris(&result), vec!["db/five", "db/seven", "x"]);
    }

    #[tokio::test]
    async fn empty_playlist_resolves_to_empty_list() {
        let lookup = Arc::new(FakeLookup::default());
        let result = resolver(FakeItems::default(), Arc::clone(&lookup), Arc::default())
            .resolve_playlist_dashboards(1, 1, 10)
            .await
            .unwrap();
        assert!(result.is_empty());
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn one_failing_tag_degrades_silently() {
        let items = FakeItems {
            items: vec![by_tag("broken"), by_tag("fine")],
            ..Default::default()
        };
        let search = Arc::new(FakeSearch {
            hits: HashMap::from([("fine".to_string(), vec![hit(3, "Three")])]),
            failing: HashSet::from(["broken".to_string()]),
            ..Default::default()
        });

        let result = resolver(items, Arc::default(), search)
            .resolve_playlist_dashboards(1, 1, 10)
            .await
            .unwrap();
        assert_eq!(uris(&result), vec!["db/three"]);
    }

    #[tokio::test]
    async fn id_lookup_failure_fails_whole_resolution() {
        let items = FakeItems {
            items: vec![by_id("1"), by_uri("x")],
            ..Default::default()
        };
        let lookup = Arc::new(FakeLookup {
            fail: true,
            ..Default::default()
        });

        let result = resolver(items, lookup, Arc::default())
            .resolve_playlist_dashboards(1, 1, 10)
            .await;
        assert_matches!(result, Err(ResolveError::ReferenceLookupFailed(_)));
    }

    #[tokio::test]
    async fn item_store_failure_is_fatal() {
        let items = FakeItems {
            fail: true,
            ..Default::default()
        };
        let result = resolver(items, Arc::default(), Arc::default())
            .resolve_playlist_dashboards(1, 1, 10)
            .await;
        assert_matches!(
            result,
            Err(ResolveError::ItemsUnavailable { playlist_id: 10, .. })
        );
    }

    #[tokio::test]
    async fn dashboard_matched_by_id_and_tag_appears_twice() {
        let items = FakeItems {
            items: vec![by_id("4"), by_tag("ops")],
            ..Default::default()
        };
        let lookup = Arc::new(FakeLookup {
            dashboards: vec![header(4, "Four")],
            ..Default::default()
        });
        let search = Arc::new(FakeSearch {
            hits: HashMap::from([("ops".to_string(), vec![hit(4, "Four")])]),
            ..Default::default()
        });

        let result = resolver(items, lookup, search)
            .resolve_playlist_dashboards(1, 1, 10)
            .await
            .unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result[0], result[1]);
    }

    #[tokio::test]
    async fn resolving_twice_is_identical() {
        let items = FakeItems {
            items: vec![by_tag("a"), by_id("1"), by_uri("u"), by_id("2")],
            ..Default::default()
        };
        let lookup = Arc::new(FakeLookup {
            dashboards: vec![header(1, "One"), header(2, "Two")],
            ..Default::default()
        });
        let search = Arc::new(FakeSearch {
            hits: HashMap::from([("a".to_string(), vec![hit(9, "Nine"), hit(1, "One")])]),
            ..Default::default()
        });
        let resolver = resolver(items, lookup, search);

        let first = resolver.resolve_playlist_dashboards(1, 1, 10).await.unwrap();
        let second = resolver.resolve_playlist_dashboards(1, 1, 10).await.unwrap();
        assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
    }
}
