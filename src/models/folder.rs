use serde::{Deserialize, Serialize};

use super::{text_value, Entity, EntityKind, ValidationError, Validator};
use crate::storage::Row;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    pub id: i64,
    pub name: String,
    #[serde(rename = "user_id")]
    pub owner_id: String,
}

impl Entity for Folder {
    const KIND: EntityKind = EntityKind::Folder;
}

/// Client payload for creating or replacing a folder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderInput {
    pub name: String,
}

impl FolderInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        Validator::default().text("name", &self.name).finish("folder")
    }

    /// Every client-writable column; owner is stamped by the service
    pub fn values(&self) -> Row {
        let mut row = Row::new();
        row.insert("name".to_string(), text_value(&self.name));
        row
    }
}
