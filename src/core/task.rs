use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::list::ListId;

/// Opaque task identifier with the same temporary/confirmed duality as
/// [`ListId`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Temporary id for a task awaiting server confirmation.
    pub fn temp() -> Self {
        Self(format!("tmp-{}", Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A task belonging to exactly one list. `touched` is the time of the
/// last mutation and is used for display ordering only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub list_id: ListId,
    pub text: String,
    pub completed: bool,
    pub touched: DateTime<Utc>,
}

impl Task {
    /// A task awaiting server confirmation, under a temporary id.
    pub fn tentative(list_id: ListId, text: impl Into<String>) -> Self {
        Self {
            id: TaskId::temp(),
            list_id,
            text: text.into(),
            completed: false,
            touched: Utc::now(),
        }
    }
}
