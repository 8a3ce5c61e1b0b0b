// Test doubles shared by the unit test modules.

#![allow(clippy::unwrap_used)]

use std::ops::Range;
use std::sync::{Arc, Mutex};

use flock_api::ListQuery;
use tokio::sync::Notify;

use crate::error::CoreError;
use crate::model::{EntityId, ResourceKind, Row};
use crate::source::{ListPage, ListSource};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestRow {
    pub id: EntityId,
}

impl Row for TestRow {
    const KIND: ResourceKind = ResourceKind::Members;

    fn id(&self) -> &EntityId {
        &self.id
    }
}

pub fn rows(ids: Range<i64>) -> Vec<TestRow> {
    ids.map(|i| TestRow {
        id: EntityId::Numeric(i),
    })
    .collect()
}

/// In-memory list that records every query it answers.
#[derive(Default)]
pub struct FakeSource {
    data: Mutex<Vec<TestRow>>,
    queries: Mutex<Vec<ListQuery>>,
    failure: Mutex<Option<CoreError>>,
    gate: Mutex<Option<Arc<Notify>>>,
}

impl FakeSource {
    pub fn with_total(total: i64) -> Self {
        let source = Self::default();
        source.set_rows(rows(0..total));
        source
    }

    pub fn set_rows(&self, data: Vec<TestRow>) {
        *self.data.lock().unwrap() = data;
    }

    pub fn fail_with(&self, err: CoreError) {
        *self.failure.lock().unwrap() = Some(err);
    }

    pub fn succeed(&self) {
        *self.failure.lock().unwrap() = None;
    }

    /// Park every following call until the returned handle is notified.
    pub fn hold(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    pub fn release(&self) {
        *self.gate.lock().unwrap() = None;
    }

    pub fn queries(&self) -> Vec<ListQuery> {
        self.queries.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.queries.lock().unwrap().len()
    }

    /// `(rangeStart, rangeEnd)` of every query so far.
    pub fn windows(&self) -> Vec<(usize, usize)> {
        self.queries
            .lock()
            .unwrap()
            .iter()
            .map(|q| (q.range_start, q.range_end))
            .collect()
    }
}

impl ListSource<TestRow> for FakeSource {
    async fn list(&self, query: ListQuery) -> Result<ListPage<TestRow>, CoreError> {
        self.queries.lock().unwrap().push(query.clone());

        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let failure = self.failure.lock().unwrap().clone();
        if let Some(err) = failure {
            return Err(err);
        }

        let data = self.data.lock().unwrap().clone();
        let start = query.range_start.min(data.len());
        let end = query.range_end.saturating_add(1).min(data.len());
        Ok(ListPage {
            results: data[start..end].to_vec(),
            total: data.len(),
        })
    }
}
