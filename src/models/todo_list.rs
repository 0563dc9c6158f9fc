use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{text_value, Entity, EntityKind, ValidationError, Validator};
use crate::storage::Row;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoList {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub folder_id: Option<i64>,
    #[serde(rename = "user_id")]
    pub owner_id: String,
}

impl Entity for TodoList {
    const KIND: EntityKind = EntityKind::TodoList;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TodoListInput {
    pub name: String,
    #[serde(default)]
    pub folder_id: Option<i64>,
}

impl TodoListInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        Validator::default()
            .text("name", &self.name)
            .id("folder_id", self.folder_id)
            .finish("list")
    }

    /// Full replacement values; a missing folder unfiles the list
    pub fn values(&self) -> Row {
        let mut row = Row::new();
        row.insert("name".to_string(), text_value(&self.name));
        row.insert(
            "folder_id".to_string(),
            self.folder_id.map(Value::from).unwrap_or(Value::Null),
        );
        row
    }
}
