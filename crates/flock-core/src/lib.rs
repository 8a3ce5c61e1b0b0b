// flock-core: paginated list cache, filter state and derived async UI
// state, shared by every list screen.

pub mod access;
pub mod config;
pub mod error;
pub mod factory;
pub mod model;
pub mod screen;
pub mod service;
pub mod source;
pub mod state;
pub mod store;
pub mod stream;

#[cfg(test)]
mod testing;

// ── Primary re-exports ──────────────────────────────────────────────
pub use access::{AllowAll, CapabilityCheck, Granted};
pub use config::{PageSizes, ServiceConfig};
pub use error::{CoreError, ErrorClass};
pub use factory::{Actions, FilterHandle, ListView, Pagination, RowContext, RowHandle, build_list_view};
pub use screen::ListScreen;
pub use service::{ListService, Notice, NoticeLevel, PageChange, PageRequest};
pub use source::{ApiSource, ListPage, ListSource};
pub use state::{AsyncState, LocalSnapshot, RemoteStatus, Retry, resolve};
pub use store::{
    FilterState, FilterStore, FilterValue, PaginationState, PaginationStore, Sort, SortDirection,
    is_sort_key,
};
pub use stream::{RowStream, RowWatchStream};

pub use model::{
    Capability, EntityId, Fellowship, Member, MemberStatus, ResourceKind, Row,
    VolunteerOpportunity,
};
