// ── Reactive row streams ──
//
// Subscription to one list's pagination state, for consumers that redraw
// on every store change.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::model::Row;
use crate::store::PaginationState;

/// Snapshot access plus change notification for a list's rows.
pub struct RowStream<T: Row> {
    current: PaginationState<T>,
    receiver: watch::Receiver<PaginationState<T>>,
}

impl<T: Row> RowStream<T> {
    pub(crate) fn new(receiver: watch::Receiver<PaginationState<T>>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// Snapshot captured at creation or at the last `changed()`.
    pub fn current(&self) -> &PaginationState<T> {
        &self.current
    }

    pub fn latest(&self) -> PaginationState<T> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next change. `None` once the store is dropped.
    pub async fn changed(&mut self) -> Option<PaginationState<T>> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = snap.clone();
        Some(snap)
    }

    pub fn into_stream(self) -> RowWatchStream<T> {
        RowWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter; yields the current state first, then every change.
pub struct RowWatchStream<T: Row> {
    inner: WatchStream<PaginationState<T>>,
}

impl<T: Row> Stream for RowWatchStream<T> {
    type Item = PaginationState<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use futures_util::StreamExt;

    use super::*;
    use crate::store::PaginationStore;
    use crate::testing::{TestRow, rows};

    fn store() -> PaginationStore<TestRow> {
        PaginationStore::new(NonZeroUsize::MIN.saturating_add(9))
    }

    #[tokio::test]
    async fn changed_tracks_store_mutations() {
        let store = store();
        let mut stream = RowStream::new(store.subscribe());
        assert!(stream.current().is_empty());

        store.init(rows(0..4), 4);

        let snap = stream.changed().await;
        assert_eq!(snap.map(|s| s.len()), Some(4));
        assert_eq!(stream.current().len(), 4);
    }

    #[tokio::test]
    async fn stream_yields_initial_then_updates() {
        let store = store();
        let mut stream = RowStream::new(store.subscribe()).into_stream();

        let first = stream.next().await;
        assert_eq!(first.map(|s| s.len()), Some(0));

        store.init(rows(0..10), 20);
        let second = stream.next().await;
        assert_eq!(second.map(|s| s.len()), Some(10));
    }

    #[tokio::test]
    async fn ends_when_store_is_dropped() {
        let store = store();
        let mut stream = RowStream::new(store.subscribe());
        drop(store);
        assert!(stream.changed().await.is_none());
    }
}
