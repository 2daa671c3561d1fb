pub mod http;

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::list::{List, ListId};
use crate::core::task::{Task, TaskId};

/// A gateway call that did not produce a server-confirmed record. Carries
/// the HTTP status when one was received; callers treat every variant
/// uniformly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkFailure {
    #[error("network error: status {0}")]
    Status(u16),
    #[error("network error: {0}")]
    Transport(String),
}

/// Server-confirmed list record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRecord {
    pub id: ListId,
    pub name: String,
    pub removable: bool,
}

impl From<ListRecord> for List {
    fn from(record: ListRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            removable: record.removable,
        }
    }
}

/// Server-confirmed task record. `touched` is epoch milliseconds on the
/// wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    pub id: TaskId,
    pub list_id: ListId,
    pub text: String,
    pub completed: bool,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub touched: DateTime<Utc>,
}

impl From<TaskRecord> for Task {
    fn from(record: TaskRecord) -> Self {
        Self {
            id: record.id,
            list_id: record.list_id,
            text: record.text,
            completed: record.completed,
            touched: record.touched,
        }
    }
}

/// The network boundary: one async operation per entity action. No retry
/// policy lives here; a failure is terminal for the attempt and reported
/// upward.
pub trait Gateway: Send + Sync + 'static {
    fn create_list(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<ListRecord, NetworkFailure>> + Send;

    fn delete_list(
        &self,
        id: &ListId,
    ) -> impl Future<Output = Result<(), NetworkFailure>> + Send;

    fn create_task(
        &self,
        list_id: &ListId,
        text: &str,
    ) -> impl Future<Output = Result<TaskRecord, NetworkFailure>> + Send;

    fn update_task_completion(
        &self,
        id: &TaskId,
        completed: bool,
    ) -> impl Future<Output = Result<TaskRecord, NetworkFailure>> + Send;

    fn delete_task(
        &self,
        id: &TaskId,
    ) -> impl Future<Output = Result<(), NetworkFailure>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_record_wire_shape() {
        let json = r#"{
            "id": "101",
            "listId": "1",
            "text": "Buy milk",
            "completed": false,
            "touched": 1700000000000
        }"#;
        let record: TaskRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, TaskId::new("101"));
        assert_eq!(record.list_id, ListId::new("1"));
        assert_eq!(record.text, "Buy milk");
        assert!(!record.completed);
        assert_eq!(record.touched.timestamp_millis(), 1_700_000_000_000);
    }

    #[test]
    fn list_record_wire_shape() {
        let json = r#"{"id": "7", "name": "Groceries", "removable": true}"#;
        let record: ListRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, ListId::new("7"));
        assert_eq!(record.name, "Groceries");
        assert!(record.removable);
    }
}
