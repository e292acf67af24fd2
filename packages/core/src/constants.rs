// ABOUTME: Filesystem locations and fixed limits for Tasklane
// ABOUTME: Resolves the ~/.tasklane directory and the files kept inside it

use std::env;
use std::path::PathBuf;

/// File name of the SQLite database inside the Tasklane directory
pub const DATABASE_FILE_NAME: &str = "tasklane.db";

/// File name of the recent-task metadata blob inside the Tasklane directory
pub const RECENT_META_FILE_NAME: &str = "recent_task_meta.json";

/// Maximum number of entries kept in the recent-task metadata buffer
pub const MAX_RECENT_TASK_META: usize = 10;

/// Get the path to the Tasklane directory (~/.tasklane)
pub fn tasklane_dir() -> PathBuf {
    // First try HOME environment variable (useful for tests)
    if let Ok(home) = env::var("HOME") {
        PathBuf::from(home).join(".tasklane")
    } else {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".tasklane")
    }
}

/// Get the path to the database file (~/.tasklane/tasklane.db)
pub fn database_file() -> PathBuf {
    tasklane_dir().join(DATABASE_FILE_NAME)
}

/// Get the path to the recency blob (~/.tasklane/recent_task_meta.json)
pub fn recent_meta_file() -> PathBuf {
    tasklane_dir().join(RECENT_META_FILE_NAME)
}
