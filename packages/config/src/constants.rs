// ABOUTME: Environment variable name constants
// ABOUTME: Centralized definitions of all environment variable names used across Tasklane

// Storage Configuration
pub const TASKLANE_DATA_DIR: &str = "TASKLANE_DATA_DIR";
pub const TASKLANE_DB_PATH: &str = "TASKLANE_DB_PATH";
pub const TASKLANE_RECENT_META_PATH: &str = "TASKLANE_RECENT_META_PATH";
pub const TASKLANE_MAX_CONNECTIONS: &str = "TASKLANE_MAX_CONNECTIONS";
pub const TASKLANE_BUSY_TIMEOUT_SECS: &str = "TASKLANE_BUSY_TIMEOUT_SECS";

// Reminder Configuration
pub const TASKLANE_NOTIFICATIONS: &str = "TASKLANE_NOTIFICATIONS";

// Identity
pub const TASKLANE_USER_ID: &str = "TASKLANE_USER_ID";

// Logging
pub const RUST_LOG: &str = "RUST_LOG";
