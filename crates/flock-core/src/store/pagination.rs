// ── Paginated row cache ──
//
// Append-only accumulation of every row fetched for one list, plus the
// page pointer and selection/expansion bookkeeping. This store never
// decides whether to fetch; `ListService` owns that policy.

use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;

use indexmap::IndexMap;
use tokio::sync::watch;
use tracing::debug;

use crate::model::{EntityId, ResourceKind, Row};
use crate::state::LocalSnapshot;

// ── State ────────────────────────────────────────────────────────────

/// Point-in-time view of a list's accumulated rows.
///
/// Cheap to clone: rows sit behind one shared `Arc`.
#[derive(Clone)]
pub struct PaginationState<T: Row> {
    /// Fetch order, not display order.
    rows: Arc<Vec<Arc<T>>>,
    selected: IndexMap<EntityId, Arc<T>>,
    expanded_id: Option<EntityId>,
    current_page: usize,
    total_results: usize,
    page_size: NonZeroUsize,
    /// Set by `init`, cleared by `reset`. An initialized empty list is data.
    loaded: bool,
    /// Bumped by `init` and `reset`; completions tagged with an older value
    /// are discarded.
    generation: u64,
}

impl<T: Row> PaginationState<T> {
    fn empty(page_size: NonZeroUsize, generation: u64) -> Self {
        Self {
            rows: Arc::new(Vec::new()),
            selected: IndexMap::new(),
            expanded_id: None,
            current_page: 1,
            total_results: 0,
            page_size,
            loaded: false,
            generation,
        }
    }

    pub fn rows(&self) -> &Arc<Vec<Arc<T>>> {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn total_results(&self) -> usize {
        self.total_results
    }

    pub fn page_size(&self) -> usize {
        self.page_size.get()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn has_data(&self) -> bool {
        self.loaded
    }

    pub fn kind(&self) -> ResourceKind {
        T::KIND
    }

    /// What the async-state resolver needs to know about this cache.
    pub fn local_snapshot(&self) -> LocalSnapshot {
        LocalSnapshot {
            kind: T::KIND,
            has_data: self.loaded,
        }
    }

    /// Number of pages touched by the accumulated rows (last may be partial).
    pub fn resident_pages(&self) -> usize {
        self.rows.len().div_ceil(self.page_size.get())
    }

    /// Number of pages the remote result set spans.
    pub fn page_count(&self) -> usize {
        self.total_results.div_ceil(self.page_size.get())
    }

    /// Whether `page` can be shown from accumulated rows alone.
    ///
    /// Full windows are resident once `page * page_size` rows are held; a
    /// trailing partial page is resident once every row is held.
    pub fn is_page_resident(&self, page: usize) -> bool {
        if page == 0 {
            return false;
        }
        let len = self.rows.len();
        let size = self.page_size.get();
        // An overflowing window can never be held.
        let Some(end) = page.checked_mul(size) else {
            return false;
        };
        end <= len || (len >= self.total_results && (page - 1) * size < len)
    }

    /// Rows that fall on `page` (1-based). Empty if the page is not resident.
    pub fn page_rows(&self, page: usize) -> &[Arc<T>] {
        let size = self.page_size.get();
        let start = page.saturating_sub(1).saturating_mul(size);
        let end = start.saturating_add(size).min(self.rows.len());
        self.rows.get(start..end).unwrap_or(&[])
    }

    pub fn current_page_rows(&self) -> &[Arc<T>] {
        self.page_rows(self.current_page)
    }

    pub fn is_selected(&self, id: &EntityId) -> bool {
        self.selected.contains_key(id)
    }

    /// Selected rows in selection order.
    pub fn selected(&self) -> impl Iterator<Item = &Arc<T>> {
        self.selected.values()
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    pub fn expanded_id(&self) -> Option<&EntityId> {
        self.expanded_id.as_ref()
    }

    pub fn is_expanded(&self, id: &EntityId) -> bool {
        self.expanded_id.as_ref() == Some(id)
    }
}

impl<T: Row> fmt::Debug for PaginationState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaginationState")
            .field("kind", &T::KIND)
            .field("rows", &self.rows.len())
            .field("selected", &self.selected.len())
            .field("expanded_id", &self.expanded_id)
            .field("current_page", &self.current_page)
            .field("total_results", &self.total_results)
            .field("page_size", &self.page_size)
            .field("loaded", &self.loaded)
            .field("generation", &self.generation)
            .finish()
    }
}

// ── Store ────────────────────────────────────────────────────────────

/// Sole owner of one list's accumulated rows.
///
/// Lives as long as the list screen. Every mutation is broadcast to
/// subscribers through a `watch` channel.
pub struct PaginationStore<T: Row> {
    state: watch::Sender<PaginationState<T>>,
}

impl<T: Row> PaginationStore<T> {
    pub fn new(page_size: NonZeroUsize) -> Self {
        let (state, _) = watch::channel(PaginationState::empty(page_size, 0));
        Self { state }
    }

    pub fn snapshot(&self) -> PaginationState<T> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PaginationState<T>> {
        self.state.subscribe()
    }

    pub fn page_size(&self) -> usize {
        self.state.borrow().page_size()
    }

    pub fn generation(&self) -> u64 {
        self.state.borrow().generation
    }

    // ── Row accumulation ─────────────────────────────────────────────

    /// Replace all rows, return to page 1 and clear the selection.
    pub fn init(&self, rows: Vec<T>, total_results: usize) {
        self.state.send_modify(|s| {
            s.rows = Arc::new(rows.into_iter().map(Arc::new).collect());
            s.selected.clear();
            s.expanded_id = None;
            s.current_page = 1;
            s.total_results = total_results;
            s.loaded = true;
            s.generation += 1;
        });
    }

    /// `init`, unless the store moved on since `generation` was read.
    pub fn init_at(&self, generation: u64, rows: Vec<T>, total_results: usize) -> bool {
        if self.generation() != generation {
            debug!(kind = %T::KIND, generation, "discarding stale first page");
            return false;
        }
        self.init(rows, total_results);
        true
    }

    /// Append `new_rows` and move to `target_page`.
    ///
    /// No deduplication: callers pass exactly the window that follows the
    /// rows already held.
    pub fn add_to_rows(&self, new_rows: Vec<T>, target_page: usize) {
        self.state.send_modify(|s| {
            Arc::make_mut(&mut s.rows).extend(new_rows.into_iter().map(Arc::new));
            s.current_page = target_page.max(1);
        });
    }

    /// `add_to_rows`, unless the store moved on since `generation` was read.
    pub fn add_to_rows_at(&self, generation: u64, new_rows: Vec<T>, target_page: usize) -> bool {
        if self.generation() != generation {
            debug!(kind = %T::KIND, generation, "discarding stale page window");
            return false;
        }
        self.add_to_rows(new_rows, target_page);
        true
    }

    /// Move the page pointer. Only for pages whose rows are already held.
    pub fn set_current_page(&self, page: usize) {
        if page == 0 {
            return;
        }
        self.state.send_if_modified(|s| {
            let changed = s.current_page != page;
            s.current_page = page;
            changed
        });
    }

    // ── Selection / expansion ────────────────────────────────────────

    pub fn toggle_select(&self, row: &Arc<T>) {
        self.state.send_modify(|s| {
            let id = row.id();
            if s.selected.shift_remove(id).is_none() {
                s.selected.insert(id.clone(), Arc::clone(row));
            }
        });
    }

    pub fn clear_selection(&self) {
        self.state.send_if_modified(|s| {
            let changed = !s.selected.is_empty();
            s.selected.clear();
            changed
        });
    }

    pub fn set_selected(&self, rows: impl IntoIterator<Item = Arc<T>>) {
        let selected: IndexMap<EntityId, Arc<T>> =
            rows.into_iter().map(|r| (r.id().clone(), r)).collect();
        self.state.send_modify(|s| s.selected = selected);
    }

    /// Expand `row`, or collapse it if it is already the expanded one.
    pub fn expand(&self, row: &T) {
        let id = row.id();
        self.state.send_modify(|s| {
            s.expanded_id = if s.expanded_id.as_ref() == Some(id) {
                None
            } else {
                Some(id.clone())
            };
        });
    }

    /// Back to the empty initial state; in-flight fetches become stale.
    pub fn reset(&self) {
        self.state.send_modify(|s| {
            *s = PaginationState::empty(s.page_size, s.generation + 1);
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::testing::{TestRow, rows};

    fn store(page_size: usize) -> PaginationStore<TestRow> {
        PaginationStore::new(NonZeroUsize::new(page_size).unwrap())
    }

    #[test]
    fn init_replaces_rows_and_resets_page_and_selection() {
        let store = store(10);
        store.init(rows(0..10), 23);
        store.add_to_rows(rows(10..20), 2);
        let first = Arc::clone(&store.snapshot().rows()[0]);
        store.toggle_select(&first);

        store.init(rows(100..105), 5);

        let snap = store.snapshot();
        assert_eq!(snap.len(), 5);
        assert_eq!(snap.current_page(), 1);
        assert_eq!(snap.total_results(), 5);
        assert_eq!(snap.selected_count(), 0);
        assert!(snap.has_data());
    }

    #[test]
    fn add_to_rows_appends_in_fetch_order() {
        let store = store(10);
        store.init(rows(0..10), 30);
        store.add_to_rows(rows(10..20), 2);
        store.add_to_rows(rows(20..30), 3);

        let snap = store.snapshot();
        assert_eq!(snap.len(), 30);
        assert_eq!(snap.current_page(), 3);
        let ids: Vec<_> = snap.current_page_rows().iter().map(|r| r.id().clone()).collect();
        assert_eq!(ids.first(), Some(&EntityId::Numeric(20)));
        assert_eq!(ids.last(), Some(&EntityId::Numeric(29)));
    }

    #[test]
    fn earlier_snapshots_are_not_mutated_by_appends() {
        let store = store(10);
        store.init(rows(0..10), 20);
        let before = store.snapshot();
        store.add_to_rows(rows(10..20), 2);
        assert_eq!(before.len(), 10);
        assert_eq!(store.snapshot().len(), 20);
    }

    #[test]
    fn expand_toggles_single_row() {
        let store = store(10);
        store.init(rows(0..3), 3);
        let snap = store.snapshot();
        let a = Arc::clone(&snap.rows()[0]);
        let b = Arc::clone(&snap.rows()[1]);

        store.expand(&a);
        assert!(store.snapshot().is_expanded(a.id()));

        store.expand(&b);
        let snap = store.snapshot();
        assert!(!snap.is_expanded(a.id()));
        assert!(snap.is_expanded(b.id()));

        store.expand(&b);
        assert_eq!(store.snapshot().expanded_id(), None);
    }

    #[test]
    fn selection_is_by_id_and_ordered() {
        let store = store(10);
        store.init(rows(0..5), 5);
        let snap = store.snapshot();
        let r3 = Arc::clone(&snap.rows()[3]);
        let r1 = Arc::clone(&snap.rows()[1]);

        store.toggle_select(&r3);
        store.toggle_select(&r1);
        let order: Vec<_> = store.snapshot().selected().map(|r| r.id().clone()).collect();
        assert_eq!(order, vec![EntityId::Numeric(3), EntityId::Numeric(1)]);

        store.toggle_select(&r3);
        assert!(!store.snapshot().is_selected(r3.id()));

        store.set_selected(vec![r3, r1]);
        assert_eq!(store.snapshot().selected_count(), 2);
        store.clear_selection();
        assert_eq!(store.snapshot().selected_count(), 0);
    }

    #[test]
    fn reset_empties_and_bumps_generation() {
        let store = store(10);
        store.init(rows(0..10), 10);
        let generation = store.generation();

        store.reset();

        let snap = store.snapshot();
        assert!(snap.is_empty());
        assert!(!snap.has_data());
        assert_eq!(snap.current_page(), 1);
        assert!(snap.generation() > generation);
    }

    #[test]
    fn stale_generation_is_discarded() {
        let store = store(10);
        store.init(rows(0..10), 30);
        let generation = store.generation();

        store.reset();

        assert!(!store.add_to_rows_at(generation, rows(10..20), 2));
        assert!(!store.init_at(generation, rows(0..10), 30));
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn residency_covers_full_and_trailing_pages() {
        let store = store(10);
        store.init(rows(0..10), 23);
        store.add_to_rows(rows(10..23), 3);
        let snap = store.snapshot();

        assert!(snap.is_page_resident(1));
        assert!(snap.is_page_resident(2));
        assert!(snap.is_page_resident(3));
        assert!(!snap.is_page_resident(4));
        assert!(!snap.is_page_resident(usize::MAX));
        assert_eq!(snap.resident_pages(), 3);
        assert_eq!(snap.page_count(), 3);
        assert_eq!(snap.page_rows(3).len(), 3);
        assert!(snap.page_rows(4).is_empty());
    }

    #[test]
    fn set_current_page_ignores_zero() {
        let store = store(10);
        store.init(rows(0..20), 20);
        store.set_current_page(2);
        store.set_current_page(0);
        assert_eq!(store.snapshot().current_page(), 2);
    }

    #[test]
    fn local_snapshot_reports_kind_and_data() {
        let store = store(10);
        assert!(!store.snapshot().local_snapshot().has_data);
        store.init(Vec::new(), 0);
        let local = store.snapshot().local_snapshot();
        assert!(local.has_data);
        assert_eq!(local.kind, ResourceKind::Members);
    }
}
