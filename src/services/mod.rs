pub mod todo_service;

use thiserror::Error;

use crate::access::AccessError;
use crate::models::{EntityKind, ValidationError};
use crate::storage::StorageError;

pub use todo_service::TodoService;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Access(#[from] AccessError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        ServiceError::Access(AccessError::Storage(err))
    }
}

impl ServiceError {
    pub fn not_found(kind: EntityKind) -> Self {
        ServiceError::Access(AccessError::NotFound(kind))
    }
}
