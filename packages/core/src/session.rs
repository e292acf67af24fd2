// ABOUTME: Session identity supplied by an external identity provider
// ABOUTME: The owner id is an opaque partition key and is never interpreted

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: Option<String>,
    pub authenticated: bool,
}

impl Session {
    /// Single-user local mode: no owner scoping.
    pub fn local() -> Self {
        Self::default()
    }

    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            authenticated: true,
        }
    }

    /// Owner key for tasks and tags, `None` in local mode.
    pub fn owner(&self) -> Option<&str> {
        if self.authenticated {
            self.user_id.as_deref()
        } else {
            None
        }
    }
}
