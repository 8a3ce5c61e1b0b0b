// ── List screen ──
//
// Composition root for one list: owns its filter store, pagination store
// and service for as long as the screen is mounted. Cheaply cloneable.

use std::num::NonZeroUsize;
use std::sync::Arc;

use futures_util::FutureExt;
use tokio::sync::{broadcast, watch};
use tracing::debug;

use crate::access::CapabilityCheck;
use crate::error::CoreError;
use crate::factory::{ListView, build_list_view};
use crate::model::Row;
use crate::service::{ListService, Notice};
use crate::source::ListSource;
use crate::state::{AsyncState, RemoteStatus, Retry, resolve};
use crate::store::{FilterStore, PaginationStore};
use crate::stream::RowStream;

pub struct ListScreen<T: Row, S> {
    service: Arc<ListService<T, S>>,
    access: Arc<dyn CapabilityCheck>,
}

impl<T: Row, S> Clone for ListScreen<T, S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            access: Arc::clone(&self.access),
        }
    }
}

impl<T: Row, S: ListSource<T>> ListScreen<T, S> {
    /// Fresh stores seeded with the kind's default filters.
    pub fn new(source: S, page_size: NonZeroUsize, access: Arc<dyn CapabilityCheck>) -> Self {
        let pagination = Arc::new(PaginationStore::new(page_size));
        let filters = Arc::new(FilterStore::for_kind(T::KIND));
        Self {
            service: Arc::new(ListService::new(source, pagination, filters)),
            access,
        }
    }

    pub fn service(&self) -> &Arc<ListService<T, S>> {
        &self.service
    }

    pub fn pagination(&self) -> &Arc<PaginationStore<T>> {
        self.service.pagination()
    }

    pub fn filters(&self) -> &Arc<FilterStore> {
        self.service.filters()
    }

    fn check_access(&self) -> Result<(), CoreError> {
        let capability = T::KIND.required_capability();
        if self.access.has(capability) {
            Ok(())
        } else {
            Err(CoreError::PermissionDenied {
                capability: capability.to_string(),
            })
        }
    }

    /// Check the view capability, then fetch the first page with the
    /// current filters. The outcome is also recorded for `state()`.
    pub async fn load(&self) -> Result<(), CoreError> {
        if let Err(err) = self.check_access() {
            debug!(kind = %T::KIND, "view capability not granted");
            self.service.record_failure(err.clone());
            return Err(err);
        }
        let params = self.filters().query_params();
        self.service.fetch_initial(params).await
    }

    /// Current UI state, derived fresh from the remote status and stores.
    pub fn state(&self) -> AsyncState<ListView<T, S>> {
        if let Err(err) = self.check_access() {
            return AsyncState::PermissionError {
                required_capability: err.required_capability().unwrap_or_default().to_owned(),
            };
        }

        let status = self.service.status();
        let snapshot = self.pagination().snapshot();
        let local = snapshot.local_snapshot();
        let filters = self.filters().snapshot();
        resolve(T::KIND, &status, Some(&local), self.retry(), || {
            build_list_view(&self.service, snapshot, filters)
        })
    }

    /// Re-runs `load()`.
    pub fn retry(&self) -> Retry {
        let screen = self.clone();
        Retry::new(move || {
            let screen = screen.clone();
            async move {
                if let Err(err) = screen.load().await {
                    debug!(kind = %T::KIND, error = %err, "retry failed");
                }
            }
            .boxed()
        })
    }

    pub fn subscribe_rows(&self) -> RowStream<T> {
        RowStream::new(self.pagination().subscribe())
    }

    pub fn subscribe_status(&self) -> watch::Receiver<RemoteStatus> {
        self.service.subscribe_status()
    }

    pub fn subscribe_notices(&self) -> broadcast::Receiver<Notice> {
        self.service.subscribe_notices()
    }

    /// Drop all accumulated rows, e.g. when the screen unmounts.
    pub fn reset(&self) {
        self.service.reset();
    }
}
