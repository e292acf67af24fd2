// ABOUTME: Error type shared by the task and tag managers
// ABOUTME: Flattens storage failures into not-found, validation, duplicate and storage cases

use tasklane_core::ValidationError;
use tasklane_storage::StorageError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ManagerError {
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Tag with name \"{0}\" already exists")]
    DuplicateName(String),

    #[error("Storage error: {0}")]
    Storage(StorageError),
}

impl ManagerError {
    pub fn task_not_found(id: &str) -> Self {
        ManagerError::NotFound {
            entity: "Task",
            id: id.to_string(),
        }
    }

    pub fn tag_not_found(id: &str) -> Self {
        ManagerError::NotFound {
            entity: "Tag",
            id: id.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ManagerError::NotFound { .. })
    }
}

impl From<StorageError> for ManagerError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { entity, id } => ManagerError::NotFound { entity, id },
            StorageError::Validation(e) => ManagerError::Validation(e),
            StorageError::DuplicateName(name) => ManagerError::DuplicateName(name),
            other => ManagerError::Storage(other),
        }
    }
}

pub type ManagerResult<T> = Result<T, ManagerError>;
