use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque list identifier. Persisted lists carry a server-assigned id;
/// in-flight creates carry a local placeholder until confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListId(String);

impl ListId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh local id for a list that exists only on this client.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Temporary id for a list awaiting server confirmation.
    pub fn temp() -> Self {
        Self(format!("tmp-{}", Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ListId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A task list. The default/home list is the only one with
/// `removable = false` and is never a removal target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct List {
    pub id: ListId,
    pub name: String,
    pub removable: bool,
}

impl List {
    /// A user-created list awaiting server confirmation, under a
    /// temporary id.
    pub fn tentative(name: impl Into<String>) -> Self {
        Self {
            id: ListId::temp(),
            name: name.into(),
            removable: true,
        }
    }
}
