// ABOUTME: Append-only audit event log backed by SQLite
// ABOUTME: Records task lifecycle events and lists them by entity, type or time window

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use tasklane_core::{generate_event_id, Event, EventCreateInput, EventType};

use crate::{StorageError, StorageResult};

const TASK_ENTITY: &str = "task";

#[derive(Clone)]
pub struct EventStorage {
    pool: SqlitePool,
}

impl EventStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Append an event about a task. Events are never updated afterwards.
    pub async fn record(&self, input: EventCreateInput) -> StorageResult<Event> {
        let event = Event {
            id: generate_event_id(),
            kind: input.kind,
            entity_id: input.entity_id,
            entity_type: TASK_ENTITY.to_string(),
            timestamp: Utc::now(),
            metadata: input.metadata,
        };

        debug!(
            "Recording event {} ({}) for {}",
            event.id,
            event.kind.as_str(),
            event.entity_id
        );

        let metadata = event
            .metadata
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        sqlx::query(
            r#"
            INSERT INTO events (id, type, entity_id, entity_type, timestamp, metadata)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&event.id)
        .bind(event.kind.as_str())
        .bind(&event.entity_id)
        .bind(&event.entity_type)
        .bind(event.timestamp)
        .bind(metadata)
        .execute(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        Ok(event)
    }

    pub async fn list_for_entity(&self, entity_id: &str) -> StorageResult<Vec<Event>> {
        debug!("Fetching events for entity: {}", entity_id);

        let rows = sqlx::query("SELECT * FROM events WHERE entity_id = ? ORDER BY timestamp")
            .bind(entity_id)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        rows.iter().map(row_to_event).collect()
    }

    pub async fn list_by_type(&self, kind: EventType) -> StorageResult<Vec<Event>> {
        debug!("Fetching events of type: {}", kind.as_str());

        let rows = sqlx::query("SELECT * FROM events WHERE type = ? ORDER BY timestamp")
            .bind(kind.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        rows.iter().map(row_to_event).collect()
    }

    /// Task events with `start <= timestamp < end`
    pub async fn list_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StorageResult<Vec<Event>> {
        debug!("Fetching events between {} and {}", start, end);

        let rows = sqlx::query(
            r#"
            SELECT * FROM events
            WHERE entity_type = ? AND timestamp >= ? AND timestamp < ?
            ORDER BY timestamp
            "#,
        )
        .bind(TASK_ENTITY)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        rows.iter().map(row_to_event).collect()
    }
}

fn row_to_event(row: &SqliteRow) -> StorageResult<Event> {
    let kind: String = row.try_get("type")?;
    let metadata: Option<String> = row.try_get("metadata")?;

    Ok(Event {
        id: row.try_get("id")?,
        kind: kind.parse().map_err(StorageError::Database)?,
        entity_id: row.try_get("entity_id")?,
        entity_type: row.try_get("entity_type")?,
        timestamp: row.try_get("timestamp")?,
        metadata: metadata.map(|m| serde_json::from_str(&m)).transpose()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;
    use chrono::Duration;
    use serde_json::json;

    #[tokio::test]
    async fn test_record_and_query_events() {
        let db = Database::open_in_memory().await.unwrap();

        db.events
            .record(EventCreateInput {
                kind: EventType::TaskCreated,
                entity_id: "t1".to_string(),
                metadata: None,
            })
            .await
            .unwrap();
        let completed = db
            .events
            .record(EventCreateInput {
                kind: EventType::TaskCompleted,
                entity_id: "t1".to_string(),
                metadata: Some(json!({ "priority": "high" })),
            })
            .await
            .unwrap();

        let for_task = db.events.list_for_entity("t1").await.unwrap();
        assert_eq!(for_task.len(), 2);

        let done = db.events.list_by_type(EventType::TaskCompleted).await.unwrap();
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].id, completed.id);
        assert_eq!(done[0].metadata, Some(json!({ "priority": "high" })));
        assert_eq!(done[0].entity_type, "task");

        let now = Utc::now();
        let window = db
            .events
            .list_between(now - Duration::hours(1), now + Duration::hours(1))
            .await
            .unwrap();
        assert_eq!(window.len(), 2);

        let empty = db
            .events
            .list_between(now + Duration::hours(1), now + Duration::hours(2))
            .await
            .unwrap();
        assert!(empty.is_empty());
    }
}
