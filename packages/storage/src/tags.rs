// ABOUTME: Tag storage layer using SQLite
// ABOUTME: Handles CRUD for tags, case-insensitive name lookup and detaching deleted tags from tasks

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use tasklane_core::{
    generate_tag_id, validate_tag_create, validate_tag_update, Tag, TagCreateInput, TagUpdateInput,
};

use crate::{StorageError, StorageResult};

#[derive(Clone)]
pub struct TagStorage {
    pool: SqlitePool,
}

impl TagStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List tags sorted by name, optionally scoped to one owner
    pub async fn list(&self, owner_id: Option<&str>) -> StorageResult<Vec<Tag>> {
        debug!("Fetching tags (owner: {:?})", owner_id);

        let mut query = String::from("SELECT * FROM tags");
        if owner_id.is_some() {
            query.push_str(" WHERE owner_id = ?");
        }
        query.push_str(" ORDER BY name COLLATE NOCASE");

        let mut q = sqlx::query(&query);
        if let Some(owner) = owner_id {
            q = q.bind(owner);
        }

        let rows = q.fetch_all(&self.pool).await.map_err(StorageError::Sqlx)?;
        rows.iter().map(row_to_tag).collect()
    }

    pub async fn get(&self, tag_id: &str) -> StorageResult<Option<Tag>> {
        debug!("Fetching tag: {}", tag_id);

        let row = sqlx::query("SELECT * FROM tags WHERE id = ?")
            .bind(tag_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        row.as_ref().map(row_to_tag).transpose()
    }

    /// Case-insensitive lookup within one owner's tags (or the unowned ones).
    pub async fn get_by_name(&self, name: &str, owner_id: Option<&str>) -> StorageResult<Option<Tag>> {
        debug!("Fetching tag by name: {} (owner: {:?})", name, owner_id);

        let row = sqlx::query(
            "SELECT * FROM tags WHERE name = ? COLLATE NOCASE AND owner_id IS ? LIMIT 1",
        )
        .bind(name.trim())
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        row.as_ref().map(row_to_tag).transpose()
    }

    /// Create a new tag. Names are unique per owner, ignoring case.
    pub async fn create(&self, input: TagCreateInput, owner_id: Option<&str>) -> StorageResult<Tag> {
        validate_tag_create(&input)?;

        let name = input.name.trim().to_string();
        if self.get_by_name(&name, owner_id).await?.is_some() {
            return Err(StorageError::DuplicateName(name));
        }

        let now = Utc::now();
        let tag = Tag {
            id: generate_tag_id(),
            owner_id: owner_id.map(str::to_string),
            name,
            color: input.color,
            created_at: now,
            updated_at: now,
        };

        debug!("Creating tag: {} (name: {})", tag.id, tag.name);

        sqlx::query(
            r#"
            INSERT INTO tags (id, owner_id, name, color, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&tag.id)
        .bind(&tag.owner_id)
        .bind(&tag.name)
        .bind(&tag.color)
        .bind(tag.created_at)
        .bind(tag.updated_at)
        .execute(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        Ok(tag)
    }

    /// Update a tag's name or color
    pub async fn update(&self, tag_id: &str, input: TagUpdateInput) -> StorageResult<Tag> {
        validate_tag_update(&input)?;

        let mut tag = self
            .get(tag_id)
            .await?
            .ok_or_else(|| StorageError::tag_not_found(tag_id))?;

        debug!("Updating tag: {}", tag_id);

        if let Some(name) = input.name {
            let name = name.trim().to_string();
            if let Some(existing) = self.get_by_name(&name, tag.owner_id.as_deref()).await? {
                if existing.id != tag.id {
                    return Err(StorageError::DuplicateName(name));
                }
            }
            tag.name = name;
        }
        if let Some(color) = input.color {
            tag.color = color;
        }
        tag.updated_at = Utc::now().max(tag.updated_at);

        sqlx::query("UPDATE tags SET name = ?, color = ?, updated_at = ? WHERE id = ?")
            .bind(&tag.name)
            .bind(&tag.color)
            .bind(tag.updated_at)
            .bind(&tag.id)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        Ok(tag)
    }

    /// Delete a tag and strip its id from every task that carries it.
    ///
    /// Membership is not indexed, so every task row is scanned. Returns the number
    /// of tasks that were detached.
    /// Detached tasks keep their `updated_at`.
    pub async fn delete(&self, tag_id: &str) -> StorageResult<usize> {
        debug!("Deleting tag: {}", tag_id);

        let rows = sqlx::query("SELECT id, tag_ids FROM tasks")
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        let mut detached = 0;
        for row in rows {
            let task_id: String = row.try_get("id")?;
            let raw: String = row.try_get("tag_ids")?;
            let tag_ids: Vec<String> = serde_json::from_str(&raw)?;

            if !tag_ids.iter().any(|t| t == tag_id) {
                continue;
            }

            let remaining: Vec<&String> = tag_ids.iter().filter(|t| *t != tag_id).collect();
            sqlx::query("UPDATE tasks SET tag_ids = ? WHERE id = ?")
                .bind(serde_json::to_string(&remaining)?)
                .bind(&task_id)
                .execute(&self.pool)
                .await
                .map_err(StorageError::Sqlx)?;
            detached += 1;
        }

        sqlx::query("DELETE FROM tags WHERE id = ?")
            .bind(tag_id)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        debug!("Tag {} removed from {} tasks", tag_id, detached);
        Ok(detached)
    }
}

fn row_to_tag(row: &SqliteRow) -> StorageResult<Tag> {
    Ok(Tag {
        id: row.try_get("id")?,
        owner_id: row.try_get("owner_id")?,
        name: row.try_get("name")?,
        color: row.try_get("color")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
