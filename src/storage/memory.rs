use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{check_row, Filters, Row, Storage, StorageError, Table};

#[derive(Debug, Default)]
struct TableData {
    next_id: i64,
    rows: Vec<Row>,
}

/// In-process storage used for development and tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<Table, TableData>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStore {
    async fn select_where(&self, table: Table, filters: &Filters) -> Result<Vec<Row>, StorageError> {
        filters.check_columns(table)?;
        let tables = self.tables.read().await;
        Ok(tables
            .get(&table)
            .map(|data| data.rows.iter().filter(|row| filters.matches(row)).cloned().collect())
            .unwrap_or_default())
    }

    async fn insert(&self, table: Table, mut row: Row) -> Result<Row, StorageError> {
        check_row(table, &row)?;
        let mut tables = self.tables.write().await;
        let data = tables.entry(table).or_default();

        // Ids ascend with insertion so the row vector stays id-ordered
        data.next_id += 1;
        row.insert("id".to_string(), Value::from(data.next_id));
        data.rows.push(row.clone());
        Ok(row)
    }

    async fn update_where(&self, table: Table, filters: &Filters, values: Row) -> Result<Row, StorageError> {
        filters.check_columns(table)?;
        check_row(table, &values)?;
        let mut tables = self.tables.write().await;

        let mut first = None;
        if let Some(data) = tables.get_mut(&table) {
            for row in data.rows.iter_mut().filter(|row| filters.matches(row)) {
                for (column, value) in &values {
                    row.insert(column.clone(), value.clone());
                }
                if first.is_none() {
                    first = Some(row.clone());
                }
            }
        }
        first.ok_or(StorageError::NoRows(table))
    }

    async fn delete_where(&self, table: Table, filters: &Filters) -> Result<(), StorageError> {
        filters.check_columns(table)?;
        let mut tables = self.tables.write().await;
        if let Some(data) = tables.get_mut(&table) {
            data.rows.retain(|row| !filters.matches(row));
        }
        Ok(())
    }

    async fn health_check(&self) -> Result<(), StorageError> {
        Ok(())
    }
}
