// ── List view factory ──
//
// Composes store snapshots and service actions into the payload of a
// `Success` state. Owns nothing: every handle holds an `Arc` to the live
// service, so a view built on an earlier render keeps acting on current
// store state.

use std::sync::Arc;

use crate::model::Row;
use crate::service::{ListService, PageChange};
use crate::source::ListSource;
use crate::store::{
    FilterState, FilterStore, FilterValue, PaginationState, PaginationStore, SortDirection,
};

// ── Filter handle ────────────────────────────────────────────────────

/// Filter and sort actions. Each committed change re-queries the list.
pub struct FilterHandle<T: Row, S> {
    service: Arc<ListService<T, S>>,
}

impl<T: Row, S> Clone for FilterHandle<T, S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
        }
    }
}

impl<T: Row, S: ListSource<T>> FilterHandle<T, S> {
    fn store(&self) -> &FilterStore {
        self.service.filters()
    }

    /// Live filter state, not the one captured when the view was built.
    pub fn current(&self) -> FilterState {
        self.store().snapshot()
    }

    /// Edit one field without re-querying.
    pub fn set_draft(&self, key: impl Into<String>, value: Option<FilterValue>) {
        self.store().set_filter(key, value);
    }

    pub fn toggle_panel(&self) {
        self.store().toggle_panel();
    }

    pub async fn apply<I, K>(&self, partial: I)
    where
        I: IntoIterator<Item = (K, Option<FilterValue>)>,
        K: Into<String>,
    {
        self.store().apply_filters(partial);
        self.service.refresh().await;
    }

    pub async fn clear(&self) {
        self.store().clear_filters();
        self.service.refresh().await;
    }

    pub async fn sort(&self, field: impl Into<String>, direction: SortDirection) {
        self.store().set_sorting(field, direction);
        self.service.refresh().await;
    }

    pub async fn clear_sort(&self) {
        self.store().clear_sorting();
        self.service.refresh().await;
    }
}

// ── Pagination descriptor ────────────────────────────────────────────

/// Page position captured at build time, plus the page-change trigger.
pub struct Pagination<T: Row, S> {
    pub current: usize,
    pub page_size: usize,
    pub total: usize,
    service: Arc<ListService<T, S>>,
}

impl<T: Row, S> Clone for Pagination<T, S> {
    fn clone(&self) -> Self {
        Self {
            current: self.current,
            page_size: self.page_size,
            total: self.total,
            service: Arc::clone(&self.service),
        }
    }
}

impl<T: Row, S: ListSource<T>> Pagination<T, S> {
    pub fn page_count(&self) -> usize {
        self.total.div_ceil(self.page_size)
    }

    pub fn has_next(&self) -> bool {
        self.current < self.page_count()
    }

    pub fn has_previous(&self) -> bool {
        self.current > 1
    }

    /// The only way to advance the page.
    pub async fn on_change(&self, page: usize) -> PageChange {
        self.service.handle_pagination(page).await
    }
}

// ── Actions ──────────────────────────────────────────────────────────

pub struct Actions<T: Row, S> {
    service: Arc<ListService<T, S>>,
}

impl<T: Row, S> Clone for Actions<T, S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
        }
    }
}

impl<T: Row, S: ListSource<T>> Actions<T, S> {
    pub async fn refresh(&self) {
        self.service.refresh().await;
    }

    pub fn clear_selection(&self) {
        self.service.pagination().clear_selection();
    }

    /// Currently selected rows, read from the live store.
    pub fn selected(&self) -> Vec<Arc<T>> {
        self.service.pagination().snapshot().selected().cloned().collect()
    }
}

// ── Rows ─────────────────────────────────────────────────────────────

/// Per-row actions bound to the live pagination store.
pub struct RowHandle<T: Row> {
    store: Arc<PaginationStore<T>>,
    row: Arc<T>,
}

impl<T: Row> Clone for RowHandle<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            row: Arc::clone(&self.row),
        }
    }
}

impl<T: Row> RowHandle<T> {
    pub fn toggle_select(&self) {
        self.store.toggle_select(&self.row);
    }

    pub fn toggle_expand(&self) {
        self.store.expand(&self.row);
    }
}

/// Everything a renderer needs for one row.
pub struct RowContext<'a, T: Row> {
    pub row: &'a Arc<T>,
    /// Position in the accumulated rows, not within the page.
    pub index: usize,
    pub selected: bool,
    pub expanded: bool,
    pub handle: RowHandle<T>,
}

// ── View ─────────────────────────────────────────────────────────────

/// Payload of a list screen's `Success` state.
pub struct ListView<T: Row, S> {
    pub total: usize,
    pub filters: FilterState,
    pub filter_actions: FilterHandle<T, S>,
    pub pagination: Pagination<T, S>,
    pub actions: Actions<T, S>,
    snapshot: PaginationState<T>,
    store: Arc<PaginationStore<T>>,
}

impl<T: Row, S> Clone for ListView<T, S> {
    fn clone(&self) -> Self {
        Self {
            total: self.total,
            filters: self.filters.clone(),
            filter_actions: self.filter_actions.clone(),
            pagination: self.pagination.clone(),
            actions: self.actions.clone(),
            snapshot: self.snapshot.clone(),
            store: Arc::clone(&self.store),
        }
    }
}

impl<T: Row, S> ListView<T, S> {
    /// Rows of the page the view was built for.
    pub fn rows(&self) -> &[Arc<T>] {
        self.snapshot.current_page_rows()
    }

    pub fn filters_applied(&self) -> bool {
        self.filters.filters_applied()
    }

    pub fn selected_count(&self) -> usize {
        self.snapshot.selected_count()
    }

    /// Invoke `render` once per row of the current page.
    pub fn render_rows<R>(&self, mut render: impl FnMut(RowContext<'_, T>) -> R) -> Vec<R> {
        let offset = self.snapshot.current_page().saturating_sub(1) * self.snapshot.page_size();
        self.rows()
            .iter()
            .enumerate()
            .map(|(i, row)| {
                render(RowContext {
                    row,
                    index: offset + i,
                    selected: self.snapshot.is_selected(row.id()),
                    expanded: self.snapshot.is_expanded(row.id()),
                    handle: RowHandle {
                        store: Arc::clone(&self.store),
                        row: Arc::clone(row),
                    },
                })
            })
            .collect()
    }
}

/// Build the success payload from store snapshots and the live service.
pub fn build_list_view<T: Row, S: ListSource<T>>(
    service: &Arc<ListService<T, S>>,
    pagination: PaginationState<T>,
    filters: FilterState,
) -> ListView<T, S> {
    ListView {
        total: pagination.total_results(),
        filters,
        filter_actions: FilterHandle {
            service: Arc::clone(service),
        },
        pagination: Pagination {
            current: pagination.current_page(),
            page_size: pagination.page_size(),
            total: pagination.total_results(),
            service: Arc::clone(service),
        },
        actions: Actions {
            service: Arc::clone(service),
        },
        store: Arc::clone(service.pagination()),
        snapshot: pagination,
    }
}
