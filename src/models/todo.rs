use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{text_value, Entity, EntityKind, ValidationError, Validator};
use crate::storage::Row;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Todo {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub priority: i32,
    pub list_id: i64,
    #[serde(rename = "user_id")]
    pub owner_id: String,
}

impl Entity for Todo {
    const KIND: EntityKind = EntityKind::Todo;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TodoInput {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub priority: Option<i32>,
}

impl TodoInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        Validator::default()
            .text("title", &self.title)
            .date("due_date", self.due_date.as_deref())
            .finish("todo")
    }

    /// Full replacement values; omitted fields fall back to their defaults
    pub fn values(&self) -> Row {
        let mut row = Row::new();
        row.insert("title".to_string(), text_value(&self.title));
        row.insert(
            "description".to_string(),
            self.description.clone().map(Value::String).unwrap_or(Value::Null),
        );
        row.insert("is_completed".to_string(), Value::Bool(self.is_completed));
        row.insert(
            "due_date".to_string(),
            self.due_date.clone().map(Value::String).unwrap_or(Value::Null),
        );
        row.insert("priority".to_string(), Value::from(self.priority.unwrap_or(0)));
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn applies_defaults() {
        let input: TodoInput = serde_json::from_value(json!({"title": "Write report"})).unwrap();
        let values = input.values();

        assert_eq!(values["is_completed"], json!(false));
        assert_eq!(values["priority"], json!(0));
        assert_eq!(values["description"], Value::Null);
        assert_eq!(values["due_date"], Value::Null);
        assert!(!values.contains_key("list_id"));
        assert!(!values.contains_key("user_id"));
    }

    #[test]
    fn null_priority_means_default() {
        let input: TodoInput = serde_json::from_value(json!({"title": "t", "priority": null})).unwrap();
        assert_eq!(input.values()["priority"], json!(0));
    }

    #[test]
    fn validates_due_date() {
        let input: TodoInput =
            serde_json::from_value(json!({"title": "t", "due_date": "next week"})).unwrap();
        let err = input.validate().unwrap_err();
        assert!(err.field_errors.contains_key("due_date"));
    }
}
