pub mod folder;
pub mod todo;
pub mod todo_list;

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::storage::{Row, StorageError, Table};

pub use folder::{Folder, FolderInput};
pub use todo::{Todo, TodoInput};
pub use todo_list::{TodoList, TodoListInput};

/// Owner column shared by every table
pub const OWNER_COLUMN: &str = "user_id";

const MAX_TEXT_LEN: usize = 255;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Folder,
    TodoList,
    Todo,
}

impl EntityKind {
    pub fn table(self) -> Table {
        match self {
            EntityKind::Folder => Table::Folders,
            EntityKind::TodoList => Table::TodoLists,
            EntityKind::Todo => Table::Todos,
        }
    }

    /// Human label used in not-found messages
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Folder => "Folder",
            EntityKind::TodoList => "Todo list",
            EntityKind::Todo => "Todo",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Typed view of a storage row
pub trait Entity: DeserializeOwned + Send + Sized {
    const KIND: EntityKind;

    fn from_row(row: Row) -> Result<Self, StorageError> {
        serde_json::from_value(Value::Object(row))
            .map_err(|e| StorageError::Decode(format!("{} row: {}", Self::KIND.table(), e)))
    }
}

#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
    pub field_errors: HashMap<String, String>,
}

/// Collects per-field problems while an input payload is checked
#[derive(Debug, Default)]
struct Validator {
    field_errors: HashMap<String, String>,
}

impl Validator {
    fn text(&mut self, field: &str, value: &str) -> &mut Self {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.field_errors.insert(field.to_string(), "This field is required".to_string());
        } else if trimmed.chars().count() > MAX_TEXT_LEN {
            self.field_errors.insert(
                field.to_string(),
                format!("Must be at most {} characters", MAX_TEXT_LEN),
            );
        }
        self
    }

    fn id(&mut self, field: &str, value: Option<i64>) -> &mut Self {
        if matches!(value, Some(id) if id <= 0) {
            self.field_errors.insert(field.to_string(), "Must be a positive id".to_string());
        }
        self
    }

    fn date(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value {
            let valid = chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
                || chrono::DateTime::parse_from_rfc3339(value).is_ok();
            if !valid {
                self.field_errors.insert(
                    field.to_string(),
                    format!("Invalid date '{}', expected YYYY-MM-DD or RFC 3339", value),
                );
            }
        }
        self
    }

    fn finish(&mut self, what: &str) -> Result<(), ValidationError> {
        if self.field_errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                message: format!("Invalid {} fields", what),
                field_errors: std::mem::take(&mut self.field_errors),
            })
        }
    }
}

fn text_value(value: &str) -> Value {
    Value::String(value.trim().to_string())
}
