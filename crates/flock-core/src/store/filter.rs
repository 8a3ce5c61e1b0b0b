// ── Filter / sort store ──
//
// Holds the user-editable narrowing criteria for one list screen and
// projects them into wire query params. Never talks to the remote side.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use strum::{Display, EnumString};
use tokio::sync::watch;
use tracing::debug;

use crate::model::{EntityId, ResourceKind};

/// Wire key for an ascending sort.
pub const ORDER_BY: &str = "orderBy";
/// Wire key for a descending sort.
pub const ORDER_BY_DESC: &str = "orderByDesc";

/// Whether `key` is reserved for the sort projection.
pub fn is_sort_key(key: &str) -> bool {
    key == ORDER_BY || key == ORDER_BY_DESC
}

/// One filter field's value. An absent key means "unset".
///
/// Tri-state booleans are encoded as absent / `Flag(true)` / `Flag(false)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FilterValue {
    Text(String),
    Flag(bool),
    Id(EntityId),
}

impl FilterValue {
    /// Empty text is indistinguishable from unset.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Text(s) if s.is_empty())
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{s}"),
            Self::Flag(b) => write!(f, "{b}"),
            Self::Id(id) => write!(f, "{id}"),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        Self::Flag(b)
    }
}

impl From<EntityId> for FilterValue {
    fn from(id: EntityId) -> Self {
        Self::Id(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// Active sort. Holding a single `Option<Sort>` makes "ascending by X" and
/// "descending by Y" mutually exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub field: String,
    pub direction: SortDirection,
}

// ── State ────────────────────────────────────────────────────────────

/// Point-in-time filter state for one list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    values: BTreeMap<String, FilterValue>,
    sort: Option<Sort>,
    filters_applied: bool,
    panel_visible: bool,
}

impl FilterState {
    fn from_defaults(defaults: &BTreeMap<String, FilterValue>) -> Self {
        Self {
            values: defaults.clone(),
            sort: None,
            filters_applied: false,
            panel_visible: false,
        }
    }

    pub fn get(&self, key: &str) -> Option<&FilterValue> {
        self.values.get(key)
    }

    pub fn values(&self) -> &BTreeMap<String, FilterValue> {
        &self.values
    }

    pub fn sort(&self) -> Option<&Sort> {
        self.sort.as_ref()
    }

    /// True iff the last apply/clear left any field different from its default.
    pub fn filters_applied(&self) -> bool {
        self.filters_applied
    }

    pub fn panel_visible(&self) -> bool {
        self.panel_visible
    }

    /// Minimal query-param projection: only set, non-empty fields, plus at
    /// most one of `orderBy` / `orderByDesc`.
    pub fn query_params(&self) -> BTreeMap<String, String> {
        let mut params: BTreeMap<String, String> = self
            .values
            .iter()
            .filter(|(k, v)| !v.is_empty() && !is_sort_key(k))
            .map(|(k, v)| (k.clone(), v.to_string()))
            .collect();

        if let Some(sort) = &self.sort {
            let key = match sort.direction {
                SortDirection::Ascending => ORDER_BY,
                SortDirection::Descending => ORDER_BY_DESC,
            };
            params.insert(key.to_owned(), sort.field.clone());
        }
        params
    }

    /// Sort keys are owned by `sort`; values under them are dropped.
    fn put(&mut self, key: String, value: Option<FilterValue>) {
        if is_sort_key(&key) {
            debug!(key = %key, "ignoring filter on a sort key");
            return;
        }
        match value.filter(|v| !v.is_empty()) {
            Some(v) => {
                self.values.insert(key, v);
            }
            None => {
                self.values.remove(&key);
            }
        }
    }
}

/// Whether any field differs from its default, treating empty text as unset.
fn differs_from_defaults(
    values: &BTreeMap<String, FilterValue>,
    defaults: &BTreeMap<String, FilterValue>,
) -> bool {
    let normalized = |m: &BTreeMap<String, FilterValue>, k: &str| {
        m.get(k).filter(|v| !v.is_empty()).cloned()
    };
    values
        .keys()
        .chain(defaults.keys())
        .any(|k| normalized(values, k.as_str()) != normalized(defaults, k.as_str()))
}

// ── Store ────────────────────────────────────────────────────────────

/// Sole owner of one list's filter state.
///
/// Mutations go through `watch::Sender::send_modify`, so subscribers see
/// every change and `snapshot()` is always current.
pub struct FilterStore {
    defaults: BTreeMap<String, FilterValue>,
    state: watch::Sender<FilterState>,
}

impl FilterStore {
    pub fn new(defaults: BTreeMap<String, FilterValue>) -> Self {
        let (state, _) = watch::channel(FilterState::from_defaults(&defaults));
        Self { defaults, state }
    }

    /// Store seeded with the default filters of a resource kind.
    pub fn for_kind(kind: ResourceKind) -> Self {
        Self::new(kind.default_filters())
    }

    pub fn snapshot(&self) -> FilterState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FilterState> {
        self.state.subscribe()
    }

    pub fn defaults(&self) -> &BTreeMap<String, FilterValue> {
        &self.defaults
    }

    /// Replace one field without validation. `None` (or empty text) unsets it.
    ///
    /// Draft edit: `filters_applied` is only recomputed by apply/clear.
    pub fn set_filter(&self, key: impl Into<String>, value: Option<FilterValue>) {
        let key = key.into();
        self.state.send_modify(|s| s.put(key, value));
    }

    /// Merge several fields, then recompute `filters_applied`.
    pub fn apply_filters<I, K>(&self, partial: I)
    where
        I: IntoIterator<Item = (K, Option<FilterValue>)>,
        K: Into<String>,
    {
        let defaults = &self.defaults;
        self.state.send_modify(|s| {
            for (key, value) in partial {
                s.put(key.into(), value);
            }
            s.filters_applied = differs_from_defaults(&s.values, defaults);
        });
    }

    /// Reset fields and sort to defaults. The panel stays open so the user
    /// sees the now-empty fields.
    pub fn clear_filters(&self) {
        let defaults = &self.defaults;
        self.state.send_modify(|s| {
            *s = FilterState::from_defaults(defaults);
            s.panel_visible = true;
        });
    }

    pub fn set_sorting(&self, field: impl Into<String>, direction: SortDirection) {
        let field = field.into();
        self.state.send_modify(|s| {
            s.sort = Some(Sort { field, direction });
        });
    }

    pub fn clear_sorting(&self) {
        self.state.send_modify(|s| s.sort = None);
    }

    pub fn set_panel_visible(&self, visible: bool) {
        self.state.send_modify(|s| s.panel_visible = visible);
    }

    pub fn toggle_panel(&self) {
        self.state.send_modify(|s| s.panel_visible = !s.panel_visible);
    }

    pub fn filters_applied(&self) -> bool {
        self.state.borrow().filters_applied
    }

    pub fn query_params(&self) -> BTreeMap<String, String> {
        self.state.borrow().query_params()
    }
}

impl Default for FilterStore {
    fn default() -> Self {
        Self::new(BTreeMap::new())
    }
}
