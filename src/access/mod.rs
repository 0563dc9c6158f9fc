//! Ownership-scoped authorization and the folder cascade guard.
//!
//! A row is visible to an identity only when its `user_id` equals that
//! identity. Absent rows and rows owned by someone else produce the same
//! [`AccessError::NotFound`], so callers can never probe for another
//! identity's ids.
//!
//! The only cascade rule is Folder → TodoList: a folder with lists cannot be
//! deleted. Lists are deleted without looking at their todos.

use thiserror::Error;
use tracing::{debug, info};

use crate::auth::Identity;
use crate::models::{Entity, EntityKind, Folder, OWNER_COLUMN};
use crate::storage::{Filters, Row, Storage, StorageError, Table};

#[derive(Debug, Error)]
pub enum AccessError {
    #[error("{0} not found")]
    NotFound(EntityKind),

    #[error("folder {folder_id} has {dependents} dependent list(s)")]
    CascadeBlocked { folder_id: i64, dependents: usize },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Outcome of the folder cascade check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteGuard {
    Allowed,
    Blocked { dependents: usize },
}

/// Filters selecting one row by id, restricted to its owner
pub fn owned(id: i64, identity: &Identity) -> Filters {
    Filters::new().eq("id", id).eq(OWNER_COLUMN, identity.as_str())
}

/// Fetch the row `id` of `kind` if and only if `identity` owns it
pub async fn authorize_row(
    storage: &dyn Storage,
    kind: EntityKind,
    id: i64,
    identity: &Identity,
) -> Result<Row, AccessError> {
    let rows = storage.select_where(kind.table(), &owned(id, identity)).await?;
    match rows.into_iter().next() {
        Some(row) => Ok(row),
        None => {
            debug!("{} {} not visible to {}", kind, id, identity);
            Err(AccessError::NotFound(kind))
        }
    }
}

/// Typed form of [`authorize_row`]
pub async fn authorize<E: Entity>(
    storage: &dyn Storage,
    id: i64,
    identity: &Identity,
) -> Result<E, AccessError> {
    let row = authorize_row(storage, E::KIND, id, identity).await?;
    Ok(E::from_row(row)?)
}

/// Ownership check on the folder, then a scan for lists still filed in it
pub async fn can_delete_folder(
    storage: &dyn Storage,
    folder_id: i64,
    identity: &Identity,
) -> Result<DeleteGuard, AccessError> {
    authorize::<Folder>(storage, folder_id, identity).await?;

    let lists = storage
        .select_where(Table::TodoLists, &Filters::new().eq("folder_id", folder_id))
        .await?;

    if lists.is_empty() {
        Ok(DeleteGuard::Allowed)
    } else {
        info!("Refusing to delete folder {}: {} list(s) still reference it", folder_id, lists.len());
        Ok(DeleteGuard::Blocked {
            dependents: lists.len(),
        })
    }
}
