//! Table-oriented storage collaborator.
//!
//! Every backend exposes the same four calls over JSON rows. Filters are
//! always an exact-match conjunction; nothing in this crate needs ranges or
//! partial matches.

pub mod memory;
pub mod postgres;
pub mod postgrest;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;
pub use postgrest::PostgrestStore;

/// A single row as the backend returns it
pub type Row = Map<String, Value>;

/// Tables known to the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Folders,
    TodoLists,
    Todos,
}

impl Table {
    pub fn name(&self) -> &'static str {
        match self {
            Table::Folders => "folders",
            Table::TodoLists => "todo_lists",
            Table::Todos => "todos",
        }
    }

    /// Columns that may appear in filters or written values
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Table::Folders => &["id", "name", "user_id"],
            Table::TodoLists => &["id", "name", "folder_id", "user_id"],
            Table::Todos => &[
                "id",
                "title",
                "description",
                "is_completed",
                "due_date",
                "priority",
                "list_id",
                "user_id",
            ],
        }
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns().contains(&column)
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Exact-match conjunction of `column = value` pairs, in insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters {
    pairs: Vec<(&'static str, Value)>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.pairs.push((column, value.into()));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        self.pairs.iter().map(|(column, value)| (*column, value))
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// True when every pair matches the row exactly
    pub fn matches(&self, row: &Row) -> bool {
        self.pairs
            .iter()
            .all(|(column, value)| row.get(*column) == Some(value))
    }

    fn check_columns(&self, table: Table) -> Result<(), StorageError> {
        match self.pairs.iter().find(|(column, _)| !table.has_column(column)) {
            Some((column, _)) => Err(StorageError::UnknownColumn {
                table: table.name(),
                column: column.to_string(),
            }),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid storage URL: {0}")]
    InvalidUrl(String),

    #[error("Unknown column '{column}' on table {table}")]
    UnknownColumn { table: &'static str, column: String },

    #[error("No rows matched in {0}")]
    NoRows(Table),

    #[error("Backend responded {status}: {body}")]
    Backend { status: u16, body: String },

    #[error("Unexpected row format: {0}")]
    Decode(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

#[async_trait]
pub trait Storage: Send + Sync {
    /// Rows matching every filter, ordered by id
    async fn select_where(&self, table: Table, filters: &Filters) -> Result<Vec<Row>, StorageError>;

    /// Insert one row and return it with its assigned id
    async fn insert(&self, table: Table, row: Row) -> Result<Row, StorageError>;

    /// Overwrite `values` on matching rows and return the first updated row
    async fn update_where(&self, table: Table, filters: &Filters, values: Row) -> Result<Row, StorageError>;

    async fn delete_where(&self, table: Table, filters: &Filters) -> Result<(), StorageError>;

    /// Cheap reachability probe used by `/health`
    async fn health_check(&self) -> Result<(), StorageError>;
}

/// Reject values that reference columns the table does not have
fn check_row(table: Table, row: &Row) -> Result<(), StorageError> {
    match row.keys().find(|column| !table.has_column(column)) {
        Some(column) => Err(StorageError::UnknownColumn {
            table: table.name(),
            column: column.clone(),
        }),
        None => Ok(()),
    }
}
