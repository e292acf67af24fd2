// ABOUTME: Application context shared by every CLI command
// ABOUTME: Opens the store from configuration and owns the task and tag controllers

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tasklane_config::Config;
use tasklane_core::{Session, Tag, Task};
use tasklane_reminders::{Notifier, ReminderScheduler};
use tasklane_storage::{Database, RecentMetaStore, StorageConfig};
use tasklane_tasks::{TagManager, TaskManager};
use tracing::debug;

pub struct App {
    pub config: Config,
    pub session: Session,
    pub db: Database,
    pub reminders: Arc<ReminderScheduler>,
    pub tasks: TaskManager,
    pub tags: TagManager,
}

impl App {
    /// Open the configured database and load the session's tasks and tags.
    pub async fn open(config: Config, notifier: Arc<dyn Notifier>) -> Result<Self> {
        let storage_config = StorageConfig {
            path: config.database_path.clone(),
            enable_wal: true,
            max_connections: config.max_connections,
            busy_timeout_seconds: config.busy_timeout_secs,
        };
        let db = Database::open(&storage_config)
            .await
            .context("Could not open the task database")?;

        Self::with_database(config, db, notifier).await
    }

    pub async fn with_database(
        config: Config,
        db: Database,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let session = config.session();
        let reminders = Arc::new(ReminderScheduler::new(notifier));
        let recent = RecentMetaStore::new(config.recent_meta_path.clone());

        let mut tasks = TaskManager::new(db.tasks.clone(), reminders.clone(), recent).await;
        let mut tags = TagManager::new(db.tags.clone());

        tasks.load(session.owner()).await?;
        tags.load(session.owner()).await?;
        debug!(
            "Loaded {} tasks and {} tags",
            tasks.tasks().len(),
            tags.tags().len()
        );

        Ok(Self {
            config,
            session,
            db,
            reminders,
            tasks,
            tags,
        })
    }

    pub fn owner(&self) -> Option<String> {
        self.session.owner().map(str::to_string)
    }

    /// Find a task by full id or by a unique id prefix.
    pub fn find_task(&self, id: &str) -> Result<Task> {
        if let Some(task) = self.tasks.get(id) {
            return Ok(task.clone());
        }

        let matches: Vec<&Task> = self
            .tasks
            .tasks()
            .iter()
            .filter(|t| t.id.starts_with(id))
            .collect();

        match matches.as_slice() {
            [task] => Ok((*task).clone()),
            [] => bail!("No task matches '{}'", id),
            _ => bail!("'{}' matches {} tasks; use a longer id", id, matches.len()),
        }
    }

    /// Find a tag by id or case-insensitive name.
    pub fn find_tag(&self, id_or_name: &str) -> Result<Tag> {
        self.tags
            .get(id_or_name)
            .or_else(|| self.tags.get_by_name(id_or_name, self.session.owner()))
            .cloned()
            .with_context(|| format!("No tag named '{}'", id_or_name))
    }

    /// Resolve tag names (or ids) to ids, failing on the first unknown one.
    pub fn tag_ids(&self, names: &[String]) -> Result<Vec<String>> {
        names
            .iter()
            .map(|name| self.find_tag(name).map(|tag| tag.id))
            .collect()
    }
}
