// ABOUTME: Runtime configuration for Tasklane, read from environment variables
// ABOUTME: Resolves storage paths, pool sizing, notification mode and the session user

pub mod constants;

use std::env;
use std::num::ParseIntError;
use std::path::PathBuf;

use tasklane_core::constants::{DATABASE_FILE_NAME, RECENT_META_FILE_NAME};
use tasklane_core::{tasklane_dir, Session};
use thiserror::Error;
use tracing::debug;

use constants::*;

const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_BUSY_TIMEOUT_SECS: u64 = 30;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid number for {key}: {source}")]
    InvalidNumber {
        key: &'static str,
        source: ParseIntError,
    },
    #[error("Invalid notification mode: {0}. Must be 'enabled' or 'disabled'")]
    InvalidNotificationMode(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub database_path: PathBuf,
    pub recent_meta_path: PathBuf,
    pub max_connections: u32,
    pub busy_timeout_secs: u64,
    pub notifications_enabled: bool,
    pub user_id: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (the environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let data_dir = non_empty(TASKLANE_DATA_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(tasklane_dir);

        let database_path = non_empty(TASKLANE_DB_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join(DATABASE_FILE_NAME));

        let recent_meta_path = non_empty(TASKLANE_RECENT_META_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join(RECENT_META_FILE_NAME));

        let max_connections = match non_empty(TASKLANE_MAX_CONNECTIONS) {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .map_err(|source| ConfigError::InvalidNumber {
                    key: TASKLANE_MAX_CONNECTIONS,
                    source,
                })?
                .clamp(1, 32),
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let busy_timeout_secs = match non_empty(TASKLANE_BUSY_TIMEOUT_SECS) {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|source| ConfigError::InvalidNumber {
                    key: TASKLANE_BUSY_TIMEOUT_SECS,
                    source,
                })?,
            None => DEFAULT_BUSY_TIMEOUT_SECS,
        };

        let notifications_enabled = match non_empty(TASKLANE_NOTIFICATIONS) {
            Some(raw) => match raw.trim().to_lowercase().as_str() {
                "enabled" | "true" | "1" => true,
                "disabled" | "false" | "0" => false,
                _ => return Err(ConfigError::InvalidNotificationMode(raw)),
            },
            None => true,
        };

        let user_id = non_empty(TASKLANE_USER_ID);

        let config = Config {
            data_dir,
            database_path,
            recent_meta_path,
            max_connections,
            busy_timeout_secs,
            notifications_enabled,
            user_id,
        };
        debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    /// Session derived from the configured user id.
    pub fn session(&self) -> Session {
        match &self.user_id {
            Some(id) => Session::for_user(id.clone()),
            None => Session::local(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_derive_from_data_dir() {
        let config = Config::from_lookup(lookup(&[(TASKLANE_DATA_DIR, "/tmp/tl")])).unwrap();

        assert_eq!(config.database_path, PathBuf::from("/tmp/tl/tasklane.db"));
        assert_eq!(
            config.recent_meta_path,
            PathBuf::from("/tmp/tl/recent_task_meta.json")
        );
        assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert!(config.notifications_enabled);
        assert_eq!(config.session(), Session::local());
    }

    #[test]
    fn test_explicit_values() {
        let config = Config::from_lookup(lookup(&[
            (TASKLANE_DB_PATH, "/data/db.sqlite"),
            (TASKLANE_MAX_CONNECTIONS, "500"),
            (TASKLANE_NOTIFICATIONS, "disabled"),
            (TASKLANE_USER_ID, "user-7"),
        ]))
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/data/db.sqlite"));
        assert_eq!(config.max_connections, 32);
        assert!(!config.notifications_enabled);
        assert_eq!(config.session().owner(), Some("user-7"));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = Config::from_lookup(lookup(&[(TASKLANE_BUSY_TIMEOUT_SECS, "soon")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidNumber {
                key: TASKLANE_BUSY_TIMEOUT_SECS,
                ..
            }
        ));

        let err = Config::from_lookup(lookup(&[(TASKLANE_NOTIFICATIONS, "loud")])).unwrap_err();
        assert_eq!(err, ConfigError::InvalidNotificationMode("loud".to_string()));
    }
}
