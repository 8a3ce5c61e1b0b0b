// ── Per-list stores ──
//
// Each list screen owns one filter store and one pagination store. Both
// publish through `watch` channels; the service layer drives them.

mod filter;
mod pagination;

pub use filter::{
    FilterState, FilterStore, FilterValue, ORDER_BY, ORDER_BY_DESC, Sort, SortDirection,
    is_sort_key,
};
pub use pagination::{PaginationState, PaginationStore};
