// ── Derived async UI state ──
//
// A list screen's visible state is recomputed from two inputs on every
// change: the status of the remote query and a snapshot of the local row
// cache. Nothing here is mutated in place.

use std::fmt;
use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::error::CoreError;
use crate::model::ResourceKind;

/// Re-runs the fetch that produced an `Error` state.
#[derive(Clone)]
pub struct Retry(Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>);

impl Retry {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn() -> BoxFuture<'static, ()> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub async fn run(&self) {
        (self.0)().await;
    }
}

impl fmt::Debug for Retry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Retry(..)")
    }
}

/// Resolution of one data-dependent UI region.
#[derive(Debug, Clone)]
pub enum AsyncState<S> {
    Idle,
    Loading { message: String },
    Error { message: String, retry: Retry },
    PermissionError { required_capability: String },
    Success { data: S },
}

impl<S> AsyncState<S> {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }

    pub fn data(&self) -> Option<&S> {
        match self {
            Self::Success { data } => Some(data),
            _ => None,
        }
    }

    pub fn into_data(self) -> Option<S> {
        match self {
            Self::Success { data } => Some(data),
            _ => None,
        }
    }
}

/// Status of the remote query that feeds a list.
#[derive(Debug, Clone, Default)]
pub enum RemoteStatus {
    #[default]
    Idle,
    Loading,
    Failed(CoreError),
    Succeeded,
}

impl RemoteStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn error(&self) -> Option<&CoreError> {
        match self {
            Self::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// What the resolver needs to know about the local row cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalSnapshot {
    pub kind: ResourceKind,
    pub has_data: bool,
}

impl LocalSnapshot {
    /// Holds data for `expected`, never for some other list.
    pub fn is_usable_for(&self, expected: ResourceKind) -> bool {
        self.has_data && self.kind == expected
    }
}

/// Derive the UI state for a `expected` list.
///
/// While a query is in flight, usable local data wins over a spinner.
/// `build_success` is only invoked when the result is `Success`.
pub fn resolve<S>(
    expected: ResourceKind,
    remote: &RemoteStatus,
    local: Option<&LocalSnapshot>,
    retry: Retry,
    build_success: impl FnOnce() -> S,
) -> AsyncState<S> {
    let usable = local.is_some_and(|l| l.is_usable_for(expected));
    match remote {
        RemoteStatus::Idle => AsyncState::Idle,
        RemoteStatus::Loading if usable => AsyncState::Success {
            data: build_success(),
        },
        RemoteStatus::Loading => AsyncState::Loading {
            message: format!("Loading {}...", expected.label()),
        },
        RemoteStatus::Failed(err) => match err.required_capability() {
            Some(capability) => AsyncState::PermissionError {
                required_capability: capability.to_owned(),
            },
            None => AsyncState::Error {
                message: err.to_string(),
                retry,
            },
        },
        RemoteStatus::Succeeded => AsyncState::Success {
            data: build_success(),
        },
    }
}
