// ABOUTME: Data layer and persistence for Tasklane
// ABOUTME: SQLite-backed store with typed adapters for tasks, tags, events and the recency blob

pub mod db;
pub mod events;
pub mod recent_meta;
pub mod tags;
pub mod tasks;

use tasklane_core::ValidationError;
use thiserror::Error;

pub use db::{Database, StorageConfig};
pub use events::EventStorage;
pub use recent_meta::{push_recent, RecentMetaStore};
pub use tags::TagStorage;
pub use tasks::TaskStorage;

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Database error: {0}")]
    Database(String),
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("Sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: String },
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("Tag with name \"{0}\" already exists")]
    DuplicateName(String),
}

impl StorageError {
    pub fn task_not_found(id: &str) -> Self {
        StorageError::NotFound {
            entity: "Task",
            id: id.to_string(),
        }
    }

    pub fn tag_not_found(id: &str) -> Self {
        StorageError::NotFound {
            entity: "Tag",
            id: id.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound { .. })
    }
}

pub type StorageResult<T> = Result<T, StorageError>;
