use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use super::ServiceError;
use crate::access::{self, AccessError, DeleteGuard};
use crate::auth::Identity;
use crate::models::{
    Entity, Folder, FolderInput, Todo, TodoInput, TodoList, TodoListInput, OWNER_COLUMN,
};
use crate::storage::{Filters, Row, Storage, StorageError};

/// Folder, list and todo operations for one authenticated identity at a time.
///
/// Owner ids always come from the verified identity, never from the payload.
/// Replacements and deletes run the ownership check before touching storage,
/// and child operations re-check the parent first.
#[derive(Clone)]
pub struct TodoService {
    storage: Arc<dyn Storage>,
}

impl TodoService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    fn store(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    pub async fn health_check(&self) -> Result<(), StorageError> {
        self.storage.health_check().await
    }

    // Folders

    pub async fn list_folders(&self, who: &Identity) -> Result<Vec<Folder>, ServiceError> {
        self.select(Filters::new().eq(OWNER_COLUMN, who.as_str())).await
    }

    pub async fn get_folder(&self, who: &Identity, id: i64) -> Result<Folder, ServiceError> {
        Ok(access::authorize(self.store(), id, who).await?)
    }

    pub async fn create_folder(&self, who: &Identity, input: &FolderInput) -> Result<Folder, ServiceError> {
        input.validate()?;
        self.insert(input.values(), who).await
    }

    pub async fn replace_folder(
        &self,
        who: &Identity,
        id: i64,
        input: &FolderInput,
    ) -> Result<Folder, ServiceError> {
        input.validate()?;
        access::authorize::<Folder>(self.store(), id, who).await?;
        self.update(id, who, input.values()).await
    }

    pub async fn delete_folder(&self, who: &Identity, id: i64) -> Result<(), ServiceError> {
        match access::can_delete_folder(self.store(), id, who).await? {
            DeleteGuard::Allowed => self.delete::<Folder>(id, who).await,
            DeleteGuard::Blocked { dependents } => Err(AccessError::CascadeBlocked {
                folder_id: id,
                dependents,
            }
            .into()),
        }
    }

    // Lists

    pub async fn list_lists(&self, who: &Identity) -> Result<Vec<TodoList>, ServiceError> {
        self.select(Filters::new().eq(OWNER_COLUMN, who.as_str())).await
    }

    pub async fn lists_in_folder(&self, who: &Identity, folder_id: i64) -> Result<Vec<TodoList>, ServiceError> {
        access::authorize::<Folder>(self.store(), folder_id, who).await?;
        self.select(
            Filters::new()
                .eq("folder_id", folder_id)
                .eq(OWNER_COLUMN, who.as_str()),
        )
        .await
    }

    pub async fn get_list(&self, who: &Identity, id: i64) -> Result<TodoList, ServiceError> {
        Ok(access::authorize(self.store(), id, who).await?)
    }

    /// Create a list, filed in `input.folder_id` when one is given
    pub async fn create_list(&self, who: &Identity, input: &TodoListInput) -> Result<TodoList, ServiceError> {
        input.validate()?;
        if let Some(folder_id) = input.folder_id {
            access::authorize::<Folder>(self.store(), folder_id, who).await?;
        }
        self.insert(input.values(), who).await
    }

    /// Create a list under the folder named in the path; the path wins over the body
    pub async fn create_list_in_folder(
        &self,
        who: &Identity,
        folder_id: i64,
        input: &TodoListInput,
    ) -> Result<TodoList, ServiceError> {
        // The path folder is checked before the body so a bad id reads as a missing folder
        access::authorize::<Folder>(self.store(), folder_id, who).await?;
        let input = TodoListInput {
            folder_id: Some(folder_id),
            ..input.clone()
        };
        input.validate()?;
        self.insert(input.values(), who).await
    }

    pub async fn replace_list(
        &self,
        who: &Identity,
        id: i64,
        input: &TodoListInput,
    ) -> Result<TodoList, ServiceError> {
        input.validate()?;
        access::authorize::<TodoList>(self.store(), id, who).await?;
        if let Some(folder_id) = input.folder_id {
            access::authorize::<Folder>(self.store(), folder_id, who).await?;
        }
        self.update(id, who, input.values()).await
    }

    /// Deletes the list only; its todos stay in storage
    pub async fn delete_list(&self, who: &Identity, id: i64) -> Result<(), ServiceError> {
        access::authorize::<TodoList>(self.store(), id, who).await?;
        self.delete::<TodoList>(id, who).await
    }

    // Todos

    pub async fn todos_in_list(&self, who: &Identity, list_id: i64) -> Result<Vec<Todo>, ServiceError> {
        access::authorize::<TodoList>(self.store(), list_id, who).await?;
        self.select(
            Filters::new()
                .eq("list_id", list_id)
                .eq(OWNER_COLUMN, who.as_str()),
        )
        .await
    }

    pub async fn get_todo(&self, who: &Identity, id: i64) -> Result<Todo, ServiceError> {
        Ok(access::authorize(self.store(), id, who).await?)
    }

    pub async fn create_todo(
        &self,
        who: &Identity,
        list_id: i64,
        input: &TodoInput,
    ) -> Result<Todo, ServiceError> {
        input.validate()?;
        access::authorize::<TodoList>(self.store(), list_id, who).await?;

        let mut row = input.values();
        row.insert("list_id".to_string(), Value::from(list_id));
        self.insert(row, who).await
    }

    pub async fn replace_todo(&self, who: &Identity, id: i64, input: &TodoInput) -> Result<Todo, ServiceError> {
        input.validate()?;
        access::authorize::<Todo>(self.store(), id, who).await?;
        self.update(id, who, input.values()).await
    }

    pub async fn delete_todo(&self, who: &Identity, id: i64) -> Result<(), ServiceError> {
        access::authorize::<Todo>(self.store(), id, who).await?;
        self.delete::<Todo>(id, who).await
    }

    // Storage plumbing

    async fn select<E: Entity>(&self, filters: Filters) -> Result<Vec<E>, ServiceError> {
        let rows = self.storage.select_where(E::KIND.table(), &filters).await?;
        rows.into_iter()
            .map(|row| E::from_row(row).map_err(ServiceError::from))
            .collect()
    }

    async fn insert<E: Entity>(&self, mut row: Row, who: &Identity) -> Result<E, ServiceError> {
        row.insert(OWNER_COLUMN.to_string(), Value::from(who.as_str()));
        let stored = self.storage.insert(E::KIND.table(), row).await?;
        let entity = E::from_row(stored)?;
        debug!("Created {} for {}", E::KIND, who);
        Ok(entity)
    }

    async fn update<E: Entity>(&self, id: i64, who: &Identity, values: Row) -> Result<E, ServiceError> {
        match self
            .storage
            .update_where(E::KIND.table(), &access::owned(id, who), values)
            .await
        {
            Ok(row) => Ok(E::from_row(row)?),
            // Deleted between the ownership check and the write
            Err(StorageError::NoRows(_)) => Err(ServiceError::not_found(E::KIND)),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete<E: Entity>(&self, id: i64, who: &Identity) -> Result<(), ServiceError> {
        self.storage
            .delete_where(E::KIND.table(), &access::owned(id, who))
            .await?;
        debug!("Deleted {} {} for {}", E::KIND, id, who);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntityKind;
    use crate::storage::Table;
    use crate::testing::{alice, bob, recording_service, Call};

    fn folder(name: &str) -> FolderInput {
        FolderInput { name: name.to_string() }
    }

    fn list(name: &str, folder_id: Option<i64>) -> TodoListInput {
        TodoListInput {
            name: name.to_string(),
            folder_id,
        }
    }

    fn todo(title: &str) -> TodoInput {
        serde_json::from_value(serde_json::json!({ "title": title })).unwrap()
    }

    fn is_not_found(err: &ServiceError, kind: EntityKind) -> bool {
        matches!(err, ServiceError::Access(AccessError::NotFound(k)) if *k == kind)
    }

    #[tokio::test]
    async fn create_stamps_the_authenticated_owner() {
        let (service, _) = recording_service();
        let input: FolderInput =
            serde_json::from_value(serde_json::json!({"name": "Work", "user_id": "mallory"})).unwrap();

        let created = service.create_folder(&alice(), &input).await.unwrap();
        assert_eq!(created.owner_id, "alice");

        let list = service.create_list(&alice(), &list("Sprint", Some(created.id))).await.unwrap();
        let todo = service.create_todo(&alice(), list.id, &todo("Write report")).await.unwrap();
        assert_eq!(todo.owner_id, "alice");
        assert_eq!(todo.list_id, list.id);
        assert!(!todo.is_completed);
        assert_eq!(todo.priority, 0);
    }

    #[tokio::test]
    async fn other_identities_see_nothing() {
        let (service, _) = recording_service();
        let f = service.create_folder(&alice(), &folder("Work")).await.unwrap();
        let l = service.create_list(&alice(), &list("Sprint", Some(f.id))).await.unwrap();
        let t = service.create_todo(&alice(), l.id, &todo("Write report")).await.unwrap();

        let bob = bob();
        assert!(is_not_found(&service.get_folder(&bob, f.id).await.unwrap_err(), EntityKind::Folder));
        assert!(is_not_found(&service.replace_folder(&bob, f.id, &folder("x")).await.unwrap_err(), EntityKind::Folder));
        assert!(is_not_found(&service.delete_folder(&bob, f.id).await.unwrap_err(), EntityKind::Folder));
        assert!(is_not_found(&service.lists_in_folder(&bob, f.id).await.unwrap_err(), EntityKind::Folder));
        assert!(is_not_found(&service.replace_list(&bob, l.id, &list("x", None)).await.unwrap_err(), EntityKind::TodoList));
        assert!(is_not_found(&service.delete_list(&bob, l.id).await.unwrap_err(), EntityKind::TodoList));
        assert!(is_not_found(&service.create_todo(&bob, l.id, &todo("x")).await.unwrap_err(), EntityKind::TodoList));
        assert!(is_not_found(&service.replace_todo(&bob, t.id, &todo("x")).await.unwrap_err(), EntityKind::Todo));
        assert!(is_not_found(&service.delete_todo(&bob, t.id).await.unwrap_err(), EntityKind::Todo));

        assert!(service.list_folders(&bob).await.unwrap().is_empty());
        assert!(service.list_lists(&bob).await.unwrap().is_empty());
        // Alice's data is untouched
        assert_eq!(service.get_todo(&alice(), t.id).await.unwrap().title, "Write report");
    }

    #[tokio::test]
    async fn scoped_read_never_touches_foreign_children() {
        let (service, store) = recording_service();
        let l = service.create_list(&alice(), &list("Sprint", None)).await.unwrap();
        service.create_todo(&alice(), l.id, &todo("secret")).await.unwrap();
        store.clear();

        let err = service.todos_in_list(&bob(), l.id).await.unwrap_err();
        assert!(is_not_found(&err, EntityKind::TodoList));
        assert_eq!(store.calls(), vec![Call::Select(Table::TodoLists)]);
        assert!(!store.touched(Table::Todos));
    }

    #[tokio::test]
    async fn replace_is_idempotent() {
        let (service, _) = recording_service();
        let l = service.create_list(&alice(), &list("Sprint", None)).await.unwrap();
        let t = service.create_todo(&alice(), l.id, &todo("draft")).await.unwrap();

        let input: TodoInput = serde_json::from_value(serde_json::json!({
            "title": "final",
            "description": "ship it",
            "is_completed": true,
            "due_date": "2025-06-01",
            "priority": 2,
            "list_id": 999,
            "user_id": "mallory"
        }))
        .unwrap();

        let first = service.replace_todo(&alice(), t.id, &input).await.unwrap();
        let second = service.replace_todo(&alice(), t.id, &input).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(second.list_id, l.id);
        assert_eq!(second.owner_id, "alice");
        assert_eq!(second.priority, 2);
    }

    #[tokio::test]
    async fn replace_resets_omitted_fields() {
        let (service, _) = recording_service();
        let l = service.create_list(&alice(), &list("Sprint", None)).await.unwrap();
        let full: TodoInput = serde_json::from_value(serde_json::json!({
            "title": "t", "description": "d", "priority": 5, "is_completed": true
        }))
        .unwrap();
        let t = service.create_todo(&alice(), l.id, &full).await.unwrap();

        let replaced = service.replace_todo(&alice(), t.id, &todo("t")).await.unwrap();
        assert_eq!(replaced.description, None);
        assert_eq!(replaced.priority, 0);
        assert!(!replaced.is_completed);
    }

    #[tokio::test]
    async fn filing_into_a_nonpositive_folder_is_not_found() {
        let (service, store) = recording_service();

        for id in [0, -3] {
            let err = service.create_list_in_folder(&alice(), id, &list("Sprint", None)).await.unwrap_err();
            assert!(is_not_found(&err, EntityKind::Folder));
        }
        assert!(!store.touched(Table::TodoLists));
    }

    #[tokio::test]
    async fn row_vanishing_before_the_write_is_not_found() {
        let (service, store) = recording_service();
        let f = service.create_folder(&alice(), &folder("Work")).await.unwrap();
        let l = service.create_list(&alice(), &list("Sprint", None)).await.unwrap();

        store.drop_updates();

        let err = service.replace_folder(&alice(), f.id, &folder("Renamed")).await.unwrap_err();
        assert!(is_not_found(&err, EntityKind::Folder));
        let err = service.replace_list(&alice(), l.id, &list("Renamed", None)).await.unwrap_err();
        assert!(is_not_found(&err, EntityKind::TodoList));
        assert!(store.calls().contains(&Call::Update(Table::Folders)));
    }

    #[tokio::test]
    async fn folder_delete_is_blocked_by_lists() {
        let (service, store) = recording_service();
        let f = service.create_folder(&alice(), &folder("Work")).await.unwrap();
        let l = service.create_list_in_folder(&alice(), f.id, &list("Sprint", None)).await.unwrap();
        assert_eq!(l.folder_id, Some(f.id));
        store.clear();

        let err = service.delete_folder(&alice(), f.id).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Access(AccessError::CascadeBlocked { dependents: 1, .. })
        ));
        assert!(!store.calls().contains(&Call::Delete(Table::Folders)));
        assert!(service.get_folder(&alice(), f.id).await.is_ok());

        service.delete_list(&alice(), l.id).await.unwrap();
        service.delete_folder(&alice(), f.id).await.unwrap();
        assert!(is_not_found(&service.get_folder(&alice(), f.id).await.unwrap_err(), EntityKind::Folder));
    }

    #[tokio::test]
    async fn deleting_a_list_leaves_its_todos_behind() {
        let (service, store) = recording_service();
        let l = service.create_list(&alice(), &list("Sprint", None)).await.unwrap();
        service.create_todo(&alice(), l.id, &todo("orphan")).await.unwrap();

        service.delete_list(&alice(), l.id).await.unwrap();

        let orphans = store
            .select_where(Table::Todos, &Filters::new().eq("list_id", l.id))
            .await
            .unwrap();
        assert_eq!(orphans.len(), 1);
        assert!(is_not_found(&service.todos_in_list(&alice(), l.id).await.unwrap_err(), EntityKind::TodoList));
    }

    #[tokio::test]
    async fn lists_cannot_be_filed_in_foreign_folders() {
        let (service, store) = recording_service();
        let bobs = service.create_folder(&bob(), &folder("Bob's")).await.unwrap();
        store.clear();

        let err = service.create_list(&alice(), &list("Sneaky", Some(bobs.id))).await.unwrap_err();
        assert!(is_not_found(&err, EntityKind::Folder));
        assert!(!store.calls().contains(&Call::Insert(Table::TodoLists)));

        let l = service.create_list(&alice(), &list("Mine", None)).await.unwrap();
        let err = service.replace_list(&alice(), l.id, &list("Mine", Some(bobs.id))).await.unwrap_err();
        assert!(is_not_found(&err, EntityKind::Folder));
        assert_eq!(service.get_list(&alice(), l.id).await.unwrap().folder_id, None);
    }

    #[tokio::test]
    async fn invalid_input_never_reaches_storage() {
        let (service, store) = recording_service();
        let err = service.create_folder(&alice(), &folder("  ")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert!(store.calls().is_empty());
    }
}
