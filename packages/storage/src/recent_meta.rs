// ABOUTME: Best-effort JSON file holding the most recent task snapshots
// ABOUTME: Read and write failures degrade to an empty buffer and are only logged

use std::path::{Path, PathBuf};

use tasklane_core::{RecentTaskMeta, MAX_RECENT_TASK_META};
use tokio::fs;
use tracing::{debug, warn};

/// Location of the recency blob. Independent of the database; losing it only
/// weakens suggestions.
#[derive(Debug, Clone)]
pub struct RecentMetaStore {
    path: PathBuf,
}

impl RecentMetaStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the buffer, most recent first. Malformed entries are skipped and an
    /// unreadable file yields an empty buffer.
    pub async fn load(&self) -> Vec<RecentTaskMeta> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!("Failed to load recent task metadata: {}", e);
                return Vec::new();
            }
        };

        let raw: Vec<serde_json::Value> = match serde_json::from_str(&content) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Failed to parse recent task metadata: {}", e);
                return Vec::new();
            }
        };

        let mut entries: Vec<RecentTaskMeta> = raw
            .into_iter()
            .filter_map(|value| serde_json::from_value(value).ok())
            .collect();
        entries.truncate(MAX_RECENT_TASK_META);

        debug!("Loaded {} recent task entries", entries.len());
        entries
    }

    /// Persist the buffer. Failures are logged and otherwise ignored.
    pub async fn save(&self, entries: &[RecentTaskMeta]) {
        let entries = &entries[..entries.len().min(MAX_RECENT_TASK_META)];

        let json = match serde_json::to_string_pretty(entries) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to serialize recent task metadata: {}", e);
                return;
            }
        };

        if let Some(parent) = self.path.parent() {
            if let Err(e) = fs::create_dir_all(parent).await {
                warn!("Failed to persist recent task metadata: {}", e);
                return;
            }
        }

        if let Err(e) = fs::write(&self.path, json).await {
            warn!("Failed to persist recent task metadata: {}", e);
        }
    }
}

/// Prepend `entry`, dropping the oldest entries beyond the cap.
pub fn push_recent(entries: &mut Vec<RecentTaskMeta>, entry: RecentTaskMeta) {
    entries.insert(0, entry);
    entries.truncate(MAX_RECENT_TASK_META);
}
