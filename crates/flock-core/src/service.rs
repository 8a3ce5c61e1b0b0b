// ── List service ──
//
// Fetch policy for one list screen: first page, range-based "fetch more",
// page-change decisions and refresh. Reads and mutates the filter and
// pagination stores; never renders anything.

use std::collections::BTreeMap;
use std::sync::Arc;

use flock_api::ListQuery;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::model::Row;
use crate::source::ListSource;
use crate::state::RemoteStatus;
use crate::store::{FilterStore, PaginationStore};

const NOTICE_CHANNEL_SIZE: usize = 32;

// ── Notices ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// Transient message for a toast/status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

// ── Requests / outcomes ──────────────────────────────────────────────

/// Window for `fetch_more`: rows `[current_page * size, next_page * size - 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub current_page: usize,
    pub next_page: usize,
    pub total: usize,
}

/// What `handle_pagination` did.
#[derive(Debug, Clone)]
pub enum PageChange {
    /// Page 0, or already on that page.
    Unchanged,
    /// Rows were already held; only the page pointer moved.
    Moved { page: usize },
    /// A window was fetched and appended.
    Fetched { page: usize, added: usize },
    /// The requested window starts past the last row.
    EndOfData,
    /// Another page fetch is still in flight.
    Busy,
    /// The list was reset or re-queried while the window was in flight.
    Stale,
    /// The fetch failed; the previous page stays visible.
    Failed(CoreError),
}

// ── Service ──────────────────────────────────────────────────────────

/// Clears `loading_more` when a page fetch ends, including when the
/// `handle_pagination` future is dropped mid-fetch.
struct LoadingMoreGuard<'a>(&'a watch::Sender<bool>);

impl Drop for LoadingMoreGuard<'_> {
    fn drop(&mut self) {
        self.0.send_replace(false);
    }
}

/// Orchestrates remote fetches against one list's stores.
pub struct ListService<T: Row, S> {
    source: S,
    pagination: Arc<PaginationStore<T>>,
    filters: Arc<FilterStore>,
    status: watch::Sender<RemoteStatus>,
    loading_more: watch::Sender<bool>,
    notices: broadcast::Sender<Notice>,
}

impl<T: Row, S: ListSource<T>> ListService<T, S> {
    pub fn new(source: S, pagination: Arc<PaginationStore<T>>, filters: Arc<FilterStore>) -> Self {
        let (status, _) = watch::channel(RemoteStatus::Idle);
        let (loading_more, _) = watch::channel(false);
        let (notices, _) = broadcast::channel(NOTICE_CHANNEL_SIZE);
        Self {
            source,
            pagination,
            filters,
            status,
            loading_more,
            notices,
        }
    }

    pub fn pagination(&self) -> &Arc<PaginationStore<T>> {
        &self.pagination
    }

    pub fn filters(&self) -> &Arc<FilterStore> {
        &self.filters
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    // ── Observables ──────────────────────────────────────────────────

    pub fn status(&self) -> RemoteStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<RemoteStatus> {
        self.status.subscribe()
    }

    pub fn is_loading_more(&self) -> bool {
        *self.loading_more.borrow()
    }

    pub fn subscribe_loading_more(&self) -> watch::Receiver<bool> {
        self.loading_more.subscribe()
    }

    pub fn subscribe_notices(&self) -> broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }

    pub fn notify(&self, notice: Notice) {
        // No subscribers is fine.
        let _ = self.notices.send(notice);
    }

    /// Record a failure that happened before any fetch (e.g. a denied capability).
    pub(crate) fn record_failure(&self, err: CoreError) {
        self.status.send_replace(RemoteStatus::Failed(err));
    }

    // ── Fetching ─────────────────────────────────────────────────────

    /// Fetch the first page with `params` and replace the stored rows.
    ///
    /// Errors propagate and are recorded in the remote status.
    pub async fn fetch_initial(&self, params: BTreeMap<String, String>) -> Result<(), CoreError> {
        let generation = self.pagination.generation();
        let page_size = self.pagination.page_size();
        let query = ListQuery::new(0, page_size - 1).with_params(params);

        self.status.send_replace(RemoteStatus::Loading);
        debug!(kind = %T::KIND, generation, params = query.params.len(), "fetching first page");

        match self.source.list(query).await {
            Ok(page) => {
                let count = page.results.len();
                if self.pagination.init_at(generation, page.results, page.total) {
                    debug!(kind = %T::KIND, count, total = page.total, "first page loaded");
                    self.status.send_replace(RemoteStatus::Succeeded);
                }
                Ok(())
            }
            Err(err) => {
                if self.pagination.generation() == generation {
                    self.status.send_replace(RemoteStatus::Failed(err.clone()));
                }
                Err(err)
            }
        }
    }

    /// Fetch the rows after `request.current_page` up to the end of
    /// `request.next_page`, using the current filters.
    ///
    /// Returns an empty vector without a remote call once the window
    /// starts past the last row. Does not touch the pagination store.
    pub async fn fetch_more(&self, request: PageRequest) -> Result<Vec<T>, CoreError> {
        let page_size = self.pagination.page_size();
        let Some(range_start) = request.current_page.checked_mul(page_size) else {
            debug!(kind = %T::KIND, page = request.current_page, "window starts past any row");
            return Ok(Vec::new());
        };
        let range_end = request.next_page.saturating_mul(page_size).saturating_sub(1);

        if request.total == 0 || range_start > request.total - 1 || range_end < range_start {
            debug!(kind = %T::KIND, range_start, total = request.total, "no more rows");
            return Ok(Vec::new());
        }

        let query = ListQuery::new(range_start, range_end).with_params(self.filters.query_params());
        debug!(kind = %T::KIND, range_start, range_end, "fetching page window");
        let page = self.source.list(query).await?;
        Ok(page.results)
    }

    /// Move to `page`, fetching its window only if the rows are not held.
    pub async fn handle_pagination(&self, page: usize) -> PageChange {
        let snap = self.pagination.snapshot();
        let current = snap.current_page();

        if page < 1 || page == current {
            return PageChange::Unchanged;
        }

        if page <= current || snap.is_page_resident(page) {
            self.pagination.set_current_page(page);
            return PageChange::Moved { page };
        }

        let claimed = self.loading_more.send_if_modified(|busy| {
            if *busy {
                false
            } else {
                *busy = true;
                true
            }
        });
        if !claimed {
            debug!(kind = %T::KIND, page, "page fetch already in flight");
            return PageChange::Busy;
        }
        let in_flight = LoadingMoreGuard(&self.loading_more);

        // Start after the last held row, not after the visible page, so a
        // user who paged backward never refetches rows already held.
        let request = PageRequest {
            current_page: snap.resident_pages(),
            next_page: page,
            total: snap.total_results(),
        };
        let result = self.fetch_more(request).await;
        drop(in_flight);

        match result {
            Ok(rows) if rows.is_empty() => PageChange::EndOfData,
            Ok(rows) => {
                let added = rows.len();
                let held = (snap.len() + added).div_ceil(snap.page_size());
                let target = page.min(held);
                if self.pagination.add_to_rows_at(snap.generation(), rows, target) {
                    PageChange::Fetched {
                        page: target,
                        added,
                    }
                } else {
                    PageChange::Stale
                }
            }
            Err(err) => {
                warn!(kind = %T::KIND, page, error = %err, "failed to load page");
                self.notify(Notice::error(format!("Could not load page {page}: {err}")));
                PageChange::Failed(err)
            }
        }
    }

    /// Drop all rows and forget the last fetch outcome.
    ///
    /// Any in-flight completion is discarded by the generation bump.
    pub fn reset(&self) {
        self.pagination.reset();
        self.status.send_replace(RemoteStatus::Idle);
    }

    /// Drop all rows and re-query with the current filters.
    ///
    /// Failures are reported as notices, not returned.
    pub async fn refresh(&self) {
        info!(kind = %T::KIND, "refreshing list");
        let params = self.filters.query_params();
        self.pagination.reset();
        if let Err(err) = self.fetch_initial(params).await {
            warn!(kind = %T::KIND, error = %err, "refresh failed");
            self.notify(Notice::error(format!(
                "Could not refresh {}: {err}",
                T::KIND.label()
            )));
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::num::NonZeroUsize;

    use pretty_assertions::assert_eq;
    use tokio_test::{assert_pending, assert_ready};

    use super::*;
    use crate::store::FilterValue;
    use crate::testing::{FakeSource, TestRow, rows};

    fn service(total: i64, page_size: usize) -> ListService<TestRow, Arc<FakeSource>> {
        let source = Arc::new(FakeSource::with_total(total));
        let pagination = Arc::new(PaginationStore::new(NonZeroUsize::new(page_size).unwrap()));
        ListService::new(source, pagination, Arc::new(FilterStore::default()))
    }

    #[tokio::test]
    async fn fetch_initial_queries_first_window() {
        let svc = service(23, 10);
        let mut params = BTreeMap::new();
        params.insert("name".to_owned(), "Grace".to_owned());

        svc.fetch_initial(params).await.unwrap();

        let queries = svc.source().queries();
        assert_eq!(queries.len(), 1);
        assert_eq!((queries[0].range_start, queries[0].range_end), (0, 9));
        assert_eq!(queries[0].params.get("name").map(String::as_str), Some("Grace"));

        let snap = svc.pagination().snapshot();
        assert_eq!(snap.len(), 10);
        assert_eq!(snap.total_results(), 23);
        assert!(matches!(svc.status(), RemoteStatus::Succeeded));
    }

    #[tokio::test]
    async fn fetch_initial_failure_propagates_and_is_recorded() {
        let svc = service(23, 10);
        svc.source().fail_with(CoreError::Fetch {
            message: "boom".into(),
            transient: true,
        });

        let err = svc.fetch_initial(BTreeMap::new()).await.unwrap_err();

        assert!(matches!(err, CoreError::Fetch { .. }));
        assert!(matches!(svc.status(), RemoteStatus::Failed(_)));
        assert!(!svc.pagination().snapshot().has_data());
    }

    #[tokio::test]
    async fn walks_to_the_end_of_a_partial_last_page() {
        let svc = service(23, 10);
        svc.fetch_initial(BTreeMap::new()).await.unwrap();
        assert_eq!(svc.pagination().snapshot().len(), 10);

        let change = svc.handle_pagination(2).await;
        assert!(matches!(change, PageChange::Fetched { page: 2, added: 10 }));
        let snap = svc.pagination().snapshot();
        assert_eq!((snap.len(), snap.current_page()), (20, 2));

        let change = svc.handle_pagination(3).await;
        assert!(matches!(change, PageChange::Fetched { page: 3, added: 3 }));
        let snap = svc.pagination().snapshot();
        assert_eq!((snap.len(), snap.current_page()), (23, 3));

        let change = svc.handle_pagination(4).await;
        assert!(matches!(change, PageChange::EndOfData));
        let snap = svc.pagination().snapshot();
        assert_eq!((snap.len(), snap.current_page()), (23, 3));

        assert_eq!(svc.source().windows(), vec![(0, 9), (10, 19), (20, 29)]);
    }

    #[tokio::test]
    async fn paging_backward_never_fetches() {
        let svc = service(50, 10);
        svc.fetch_initial(BTreeMap::new()).await.unwrap();
        svc.handle_pagination(2).await;
        svc.handle_pagination(3).await;
        let calls = svc.source().calls();

        for page in [2, 1, 3, 2, 2, 1] {
            let change = svc.handle_pagination(page).await;
            assert!(matches!(
                change,
                PageChange::Moved { .. } | PageChange::Unchanged
            ));
        }

        assert_eq!(svc.source().calls(), calls);
        assert_eq!(svc.pagination().snapshot().len(), 30);
    }

    #[tokio::test]
    async fn warmed_window_is_reused() {
        let svc = service(50, 10);
        svc.pagination().init(rows(0..30), 50);

        let change = svc.handle_pagination(3).await;

        assert!(matches!(change, PageChange::Moved { page: 3 }));
        assert_eq!(svc.source().calls(), 0);
        assert_eq!(svc.pagination().snapshot().current_page(), 3);
    }

    #[tokio::test]
    async fn forward_after_backward_continues_after_held_rows() {
        let svc = service(50, 10);
        svc.pagination().init(rows(0..30), 50);
        svc.handle_pagination(1).await;

        let change = svc.handle_pagination(4).await;

        assert!(matches!(change, PageChange::Fetched { page: 4, added: 10 }));
        assert_eq!(svc.source().windows(), vec![(30, 39)]);
        assert_eq!(svc.pagination().snapshot().len(), 40);
    }

    #[tokio::test]
    async fn jumping_ahead_fetches_the_whole_gap() {
        let svc = service(100, 10);
        svc.fetch_initial(BTreeMap::new()).await.unwrap();

        let change = svc.handle_pagination(5).await;

        assert!(matches!(change, PageChange::Fetched { page: 5, added: 40 }));
        assert_eq!(svc.source().windows(), vec![(0, 9), (10, 49)]);
        let current: Vec<_> = svc
            .pagination()
            .snapshot()
            .current_page_rows()
            .iter()
            .map(|r| r.id.clone())
            .collect();
        assert_eq!(current.first(), Some(&crate::model::EntityId::Numeric(40)));
    }

    #[tokio::test]
    async fn fetch_more_stops_at_end_of_data() {
        let svc = service(25, 10);

        let rows = svc
            .fetch_more(PageRequest {
                current_page: 2,
                next_page: 3,
                total: 25,
            })
            .await
            .unwrap();
        assert_eq!(rows.len(), 5);
        assert_eq!(svc.source().windows(), vec![(20, 29)]);

        let rows = svc
            .fetch_more(PageRequest {
                current_page: 3,
                next_page: 4,
                total: 25,
            })
            .await
            .unwrap();
        assert!(rows.is_empty());
        assert_eq!(svc.source().calls(), 1);
    }

    #[tokio::test]
    async fn fetch_more_uses_current_filters() {
        let svc = service(40, 10);
        svc.filters()
            .apply_filters([("name", Some(FilterValue::from("Ruth")))]);

        svc.fetch_more(PageRequest {
            current_page: 1,
            next_page: 2,
            total: 40,
        })
        .await
        .unwrap();

        let query = &svc.source().queries()[0];
        assert_eq!(query.params.get("name").map(String::as_str), Some("Ruth"));
    }

    #[tokio::test]
    async fn failed_page_fetch_keeps_old_page_and_notifies() {
        let svc = service(30, 10);
        svc.fetch_initial(BTreeMap::new()).await.unwrap();
        let mut notices = svc.subscribe_notices();
        svc.source().fail_with(CoreError::Fetch {
            message: "timeout".into(),
            transient: true,
        });

        let change = svc.handle_pagination(2).await;

        assert!(matches!(change, PageChange::Failed(_)));
        let snap = svc.pagination().snapshot();
        assert_eq!((snap.len(), snap.current_page()), (10, 1));
        assert!(matches!(svc.status(), RemoteStatus::Succeeded));
        assert!(!svc.is_loading_more());
        let notice = notices.try_recv().unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert!(notice.message.contains("page 2"));
    }

    #[tokio::test]
    async fn refresh_refetches_with_current_filters() {
        let svc = service(30, 10);
        svc.fetch_initial(BTreeMap::new()).await.unwrap();
        svc.handle_pagination(2).await;
        svc.filters()
            .apply_filters([("status", Some(FilterValue::from("visitor")))]);

        svc.refresh().await;

        let snap = svc.pagination().snapshot();
        assert_eq!((snap.len(), snap.current_page()), (10, 1));
        let last = svc.source().queries().pop().unwrap();
        assert_eq!((last.range_start, last.range_end), (0, 9));
        assert_eq!(last.params.get("status").map(String::as_str), Some("visitor"));
    }

    #[tokio::test]
    async fn refresh_failure_is_reported_not_returned() {
        let svc = service(30, 10);
        svc.fetch_initial(BTreeMap::new()).await.unwrap();
        let mut notices = svc.subscribe_notices();
        svc.source().fail_with(CoreError::Fetch {
            message: "offline".into(),
            transient: true,
        });

        svc.refresh().await;

        let notice = notices.try_recv().unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert!(matches!(svc.status(), RemoteStatus::Failed(_)));
    }

    #[tokio::test]
    async fn stale_page_window_is_discarded_after_reset() {
        let svc = service(30, 10);
        svc.fetch_initial(BTreeMap::new()).await.unwrap();
        let gate = svc.source().hold();

        let mut pending = tokio_test::task::spawn(svc.handle_pagination(2));
        assert_pending!(pending.poll());
        assert!(svc.is_loading_more());

        svc.pagination().reset();
        svc.pagination().init(rows(100..105), 5);
        gate.notify_one();

        let change = assert_ready!(pending.poll());
        assert!(matches!(change, PageChange::Stale));
        let snap = svc.pagination().snapshot();
        assert_eq!(snap.len(), 5);
        assert_eq!(snap.current_page(), 1);
    }

    #[tokio::test]
    async fn concurrent_page_fetch_is_rejected() {
        let svc = service(30, 10);
        svc.fetch_initial(BTreeMap::new()).await.unwrap();
        let gate = svc.source().hold();

        let mut first = tokio_test::task::spawn(svc.handle_pagination(2));
        assert_pending!(first.poll());

        let second = svc.handle_pagination(3).await;
        assert!(matches!(second, PageChange::Busy));

        svc.source().release();
        gate.notify_one();
        let change = assert_ready!(first.poll());
        assert!(matches!(change, PageChange::Fetched { page: 2, .. }));
        assert_eq!(svc.source().calls(), 2);
    }

    #[tokio::test]
    async fn dropped_page_fetch_releases_the_busy_flag() {
        let svc = service(30, 10);
        svc.fetch_initial(BTreeMap::new()).await.unwrap();
        let _gate = svc.source().hold();

        let mut pending = tokio_test::task::spawn(svc.handle_pagination(2));
        assert_pending!(pending.poll());
        assert!(svc.is_loading_more());
        drop(pending);

        assert!(!svc.is_loading_more());
        svc.source().release();
        let change = svc.handle_pagination(2).await;
        assert!(matches!(change, PageChange::Fetched { page: 2, added: 10 }));
    }

    #[tokio::test]
    async fn huge_page_number_stops_at_the_last_row() {
        let svc = service(23, 10);
        svc.fetch_initial(BTreeMap::new()).await.unwrap();

        let change = svc.handle_pagination(usize::MAX).await;
        assert!(matches!(change, PageChange::Fetched { page: 3, added: 13 }));
        assert_eq!(svc.source().windows().last(), Some(&(10, usize::MAX - 1)));

        let change = svc.handle_pagination(usize::MAX).await;
        assert!(matches!(change, PageChange::EndOfData));
        assert_eq!(svc.source().calls(), 2);
        assert!(!svc.is_loading_more());
    }

    #[tokio::test]
    async fn window_starting_past_usize_is_empty() {
        let svc = service(23, 10);
        let fetched = svc
            .fetch_more(PageRequest {
                current_page: usize::MAX,
                next_page: usize::MAX,
                total: 23,
            })
            .await
            .unwrap();

        assert!(fetched.is_empty());
        assert_eq!(svc.source().calls(), 0);
    }

    #[tokio::test]
    async fn reset_returns_status_to_idle() {
        let svc = service(23, 10);
        svc.fetch_initial(BTreeMap::new()).await.unwrap();

        svc.reset();

        assert!(matches!(svc.status(), RemoteStatus::Idle));
        assert!(svc.pagination().snapshot().is_empty());
    }
}
