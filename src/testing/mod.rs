use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::auth::Identity;
use crate::services::TodoService;
use crate::storage::{Filters, MemoryStore, Row, Storage, StorageError, Table};

/// One storage call as seen by [`RecordingStore`]
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Select(Table),
    Insert(Table),
    Update(Table),
    Delete(Table),
}

/// Memory store that remembers every call made against it
#[derive(Default)]
pub struct RecordingStore {
    inner: MemoryStore,
    calls: Mutex<Vec<Call>>,
    dropping_updates: AtomicBool,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.clear();
        }
    }

    /// True if any call touched `table`
    pub fn touched(&self, table: Table) -> bool {
        self.calls().iter().any(|call| match call {
            Call::Select(t) | Call::Insert(t) | Call::Update(t) | Call::Delete(t) => *t == table,
        })
    }

    /// Make every later update match nothing, as if the row was deleted after its check
    pub fn drop_updates(&self) {
        self.dropping_updates.store(true, Ordering::SeqCst);
    }

    fn record(&self, call: Call) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

#[async_trait]
impl Storage for RecordingStore {
    async fn select_where(&self, table: Table, filters: &Filters) -> Result<Vec<Row>, StorageError> {
        self.record(Call::Select(table));
        self.inner.select_where(table, filters).await
    }

    async fn insert(&self, table: Table, row: Row) -> Result<Row, StorageError> {
        self.record(Call::Insert(table));
        self.inner.insert(table, row).await
    }

    async fn update_where(&self, table: Table, filters: &Filters, values: Row) -> Result<Row, StorageError> {
        self.record(Call::Update(table));
        if self.dropping_updates.load(Ordering::SeqCst) {
            return Err(StorageError::NoRows(table));
        }
        self.inner.update_where(table, filters, values).await
    }

    async fn delete_where(&self, table: Table, filters: &Filters) -> Result<(), StorageError> {
        self.record(Call::Delete(table));
        self.inner.delete_where(table, filters).await
    }

    async fn health_check(&self) -> Result<(), StorageError> {
        self.inner.health_check().await
    }
}

/// Service over a fresh recording store, plus a handle to inspect the calls
pub fn recording_service() -> (TodoService, Arc<RecordingStore>) {
    let store = Arc::new(RecordingStore::new());
    (TodoService::new(store.clone()), store)
}

pub fn alice() -> Identity {
    Identity::new("alice")
}

pub fn bob() -> Identity {
    Identity::new("bob")
}

/// Build a row from a JSON object literal
pub fn row(value: Value) -> Row {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {}", other),
    }
}
