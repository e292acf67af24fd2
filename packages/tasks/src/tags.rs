// ABOUTME: Tag lifecycle controller owning the in-memory tag cache
// ABOUTME: Keeps tags sorted by name and enforces per-owner case-insensitive name uniqueness

use tasklane_core::{Tag, TagCreateInput, TagUpdateInput};
use tasklane_storage::TagStorage;
use tracing::{debug, warn};

use crate::error::{ManagerError, ManagerResult};

pub struct TagManager {
    storage: TagStorage,
    tags: Vec<Tag>,
    selected: Option<String>,
    last_error: Option<String>,
}

impl TagManager {
    pub fn new(storage: TagStorage) -> Self {
        Self {
            storage,
            tags: Vec::new(),
            selected: None,
            last_error: None,
        }
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn record<T>(&mut self, result: ManagerResult<T>) -> ManagerResult<T> {
        if let Err(e) = &result {
            warn!("Tag operation failed: {}", e);
            self.last_error = Some(e.to_string());
        }
        result
    }

    fn sort(&mut self) {
        self.tags.sort_by_key(|t| t.name.to_lowercase());
    }

    pub async fn load(&mut self, owner_id: Option<&str>) -> ManagerResult<()> {
        self.last_error = None;
        debug!("Loading tags (owner: {:?})", owner_id);

        match self.storage.list(owner_id).await {
            Ok(tags) => {
                self.tags = tags;
                self.sort();
                Ok(())
            }
            Err(e) => {
                self.tags.clear();
                self.record(Err(e.into()))
            }
        }
    }

    pub fn get(&self, tag_id: &str) -> Option<&Tag> {
        self.tags.iter().find(|t| t.id == tag_id)
    }

    /// Case-insensitive lookup among the cached tags of one owner
    pub fn get_by_name(&self, name: &str, owner_id: Option<&str>) -> Option<&Tag> {
        let name = name.trim().to_lowercase();
        self.tags
            .iter()
            .filter(|t| t.owner_id.as_deref() == owner_id)
            .find(|t| t.name.to_lowercase() == name)
    }

    pub async fn create(&mut self, input: TagCreateInput, owner_id: Option<&str>) -> ManagerResult<Tag> {
        self.last_error = None;

        if self.get_by_name(&input.name, owner_id).is_some() {
            let err = ManagerError::DuplicateName(input.name.trim().to_string());
            return self.record(Err(err));
        }

        let result = self.storage.create(input, owner_id).await.map_err(Into::into);
        let tag = self.record(result)?;

        self.tags.push(tag.clone());
        self.sort();
        Ok(tag)
    }

    pub async fn update(&mut self, tag_id: &str, input: TagUpdateInput) -> ManagerResult<Tag> {
        self.last_error = None;

        if let Some(name) = &input.name {
            let owner_id = self.get(tag_id).and_then(|t| t.owner_id.clone());
            if let Some(existing) = self.get_by_name(name, owner_id.as_deref()) {
                if existing.id != tag_id {
                    let err = ManagerError::DuplicateName(name.trim().to_string());
                    return self.record(Err(err));
                }
            }
        }

        let result = self.storage.update(tag_id, input).await.map_err(Into::into);
        let tag = self.record(result)?;

        match self.tags.iter_mut().find(|t| t.id == tag_id) {
            Some(slot) => *slot = tag.clone(),
            None => self.tags.push(tag.clone()),
        }
        self.sort();
        Ok(tag)
    }

    /// Delete a tag; the store detaches it from every task. Returns how many
    /// tasks carried it.
    pub async fn delete(&mut self, tag_id: &str) -> ManagerResult<usize> {
        self.last_error = None;

        let result = self.storage.delete(tag_id).await.map_err(Into::into);
        let detached = self.record(result)?;

        self.tags.retain(|t| t.id != tag_id);
        if self.selected.as_deref() == Some(tag_id) {
            self.selected = None;
        }
        Ok(detached)
    }

    pub fn select(&mut self, tag_id: Option<&str>) {
        self.selected = tag_id.map(str::to_string);
    }

    pub fn selected(&self) -> Option<&Tag> {
        self.selected.as_deref().and_then(|id| self.get(id))
    }

    pub fn reset(&mut self) {
        self.tags.clear();
        self.selected = None;
        self.last_error = None;
    }
}
