// ── Remote list sources ──
//
// The seam between the list core and the network. Production code uses
// `ApiSource`; tests substitute a scripted source.

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use flock_api::{ApiClient, ListQuery};
use serde::de::DeserializeOwned;

use crate::error::CoreError;
use crate::model::Row;

/// One window of rows plus the authoritative total for the filter set.
#[derive(Debug, Clone)]
pub struct ListPage<T> {
    pub results: Vec<T>,
    pub total: usize,
}

impl<T> ListPage<T> {
    pub fn empty(total: usize) -> Self {
        Self {
            results: Vec::new(),
            total,
        }
    }
}

/// Anything that can answer a windowed list query for `T`.
pub trait ListSource<T: Row>: Send + Sync + 'static {
    fn list(&self, query: ListQuery) -> impl Future<Output = Result<ListPage<T>, CoreError>> + Send;
}

impl<T: Row, S: ListSource<T>> ListSource<T> for Arc<S> {
    fn list(&self, query: ListQuery) -> impl Future<Output = Result<ListPage<T>, CoreError>> + Send {
        (**self).list(query)
    }
}

/// HTTP-backed source: `GET {base}/{kind path}?rangeStart=..&rangeEnd=..`.
pub struct ApiSource<T> {
    client: ApiClient,
    _row: PhantomData<fn() -> T>,
}

impl<T> ApiSource<T> {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            _row: PhantomData,
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }
}

impl<T> Clone for ApiSource<T> {
    fn clone(&self) -> Self {
        Self::new(self.client.clone())
    }
}

impl<T: Row + DeserializeOwned> ListSource<T> for ApiSource<T> {
    async fn list(&self, query: ListQuery) -> Result<ListPage<T>, CoreError> {
        let resp = self.client.list::<T>(T::KIND.path(), &query).await?;
        Ok(ListPage {
            results: resp.results,
            total: resp.total,
        })
    }
}
