// ABOUTME: Database connection management and storage initialization
// ABOUTME: Opens the SQLite pool, applies pragmas and migrations, hands out the adapters

use std::path::PathBuf;
use std::time::Duration;

use sqlx::migrate::MigrateDatabase;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};

use crate::events::EventStorage;
use crate::tags::TagStorage;
use crate::tasks::TaskStorage;
use crate::{StorageError, StorageResult};

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub path: PathBuf,
    pub enable_wal: bool,
    pub max_connections: u32,
    pub busy_timeout_seconds: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: tasklane_core::database_file(),
            enable_wal: true,
            max_connections: 5,
            busy_timeout_seconds: 30,
        }
    }
}

/// Shared handle to the store and its adapters
#[derive(Clone)]
pub struct Database {
    pub pool: SqlitePool,
    pub tasks: TaskStorage,
    pub tags: TagStorage,
    pub events: EventStorage,
}

impl Database {
    fn from_pool(pool: SqlitePool) -> Self {
        Self {
            tasks: TaskStorage::new(pool.clone()),
            tags: TagStorage::new(pool.clone()),
            events: EventStorage::new(pool.clone()),
            pool,
        }
    }

    /// Open (creating if needed) the on-disk database and bring the schema up to date.
    ///
    /// Any failure is reported as [`StorageError::Unavailable`]; callers treat it as fatal.
    pub async fn open(config: &StorageConfig) -> StorageResult<Self> {
        match Self::connect(config).await {
            Ok(pool) => {
                info!("Database ready at {}", config.path.display());
                Ok(Self::from_pool(pool))
            }
            Err(e) => Err(StorageError::Unavailable(format!(
                "{}: {}",
                config.path.display(),
                e
            ))),
        }
    }

    /// Fresh private in-memory database with the full schema.
    ///
    /// Uses a single long-lived connection, since every SQLite in-memory
    /// connection is its own database.
    pub async fn open_in_memory() -> StorageResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;

        migrate(&pool)
            .await
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;

        Ok(Self::from_pool(pool))
    }

    async fn connect(config: &StorageConfig) -> StorageResult<SqlitePool> {
        // Ensure parent directory exists
        if let Some(parent) = config.path.parent() {
            std::fs::create_dir_all(parent).map_err(StorageError::Io)?;
        }

        let database_url = format!("sqlite:{}", config.path.display());

        if !sqlx::Sqlite::database_exists(&database_url)
            .await
            .map_err(StorageError::Sqlx)?
        {
            debug!("Creating database at: {}", database_url);
            sqlx::Sqlite::create_database(&database_url)
                .await
                .map_err(StorageError::Sqlx)?;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.busy_timeout_seconds))
            .connect(&database_url)
            .await
            .map_err(StorageError::Sqlx)?;

        if config.enable_wal {
            sqlx::query("PRAGMA journal_mode = WAL")
                .execute(&pool)
                .await
                .map_err(StorageError::Sqlx)?;
        }

        sqlx::query("PRAGMA foreign_keys = ON")
            .execute(&pool)
            .await
            .map_err(StorageError::Sqlx)?;

        sqlx::query("PRAGMA synchronous = NORMAL")
            .execute(&pool)
            .await
            .map_err(StorageError::Sqlx)?;

        migrate(&pool).await?;

        Ok(pool)
    }
}

/// Apply every pending schema migration. Migrations are additive only.
pub async fn migrate(pool: &SqlitePool) -> StorageResult<()> {
    debug!("Running database migrations");
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(StorageError::Migration)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_creates_file_and_schema() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            path: dir.path().join("nested").join("tasklane.db"),
            ..Default::default()
        };

        let db = Database::open(&config).await.unwrap();
        assert!(config.path.exists());

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name IN ('tasks', 'tags', 'events') ORDER BY name",
        )
        .fetch_all(&db.pool)
        .await
        .unwrap();
        assert_eq!(tables, vec!["events", "tags", "tasks"]);
    }

    #[tokio::test]
    async fn test_reopen_keeps_existing_records() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            path: dir.path().join("tasklane.db"),
            ..Default::default()
        };

        let db = Database::open(&config).await.unwrap();
        let task = db
            .tasks
            .create(tasklane_core::TaskCreateInput::new("persisted"), None)
            .await
            .unwrap();
        db.pool.close().await;

        let reopened = Database::open(&config).await.unwrap();
        let found = reopened.tasks.get(&task.id).await.unwrap();
        assert_eq!(found.map(|t| t.title), Some("persisted".to_string()));
    }

    #[tokio::test]
    async fn test_open_fails_when_path_is_unusable() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"file").unwrap();

        let config = StorageConfig {
            path: blocker.join("tasklane.db"),
            ..Default::default()
        };

        let err = Database::open(&config).await.err().unwrap();
        assert!(matches!(err, StorageError::Unavailable(_)));
    }
}
