use serde::Serialize;
use thiserror::Error;

use crate::api::{ListRecord, TaskRecord};
use crate::core::list::{List, ListId};
use crate::core::task::{Task, TaskId};

/// The store was asked to touch an entity that is not there, or to break
/// a structural invariant. These are programmer errors, not user-facing
/// failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("unknown list: {0}")]
    UnknownList(ListId),
    #[error("unknown task: {0}")]
    UnknownTask(TaskId),
    #[error("the default list cannot be removed")]
    DefaultListRemoval,
    #[error("expected exactly one non-removable default list")]
    NoDefaultList,
}

/// Read-only view of the store handed to the view binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub lists: Vec<List>,
    pub tasks: Vec<Task>,
    pub current_list_id: ListId,
}

/// In-memory state: all lists and tasks plus the active-list pointer,
/// in insertion order. Owned for the lifetime of the session; the
/// controller is the only writer.
#[derive(Debug, Clone)]
pub struct Store {
    lists: Vec<List>,
    tasks: Vec<Task>,
    current_list_id: ListId,
    default_list_id: ListId,
}

impl Store {
    /// Store holding a single fresh non-removable default list.
    pub fn with_default_list(name: impl Into<String>) -> Self {
        let default = List {
            id: ListId::generate(),
            name: name.into(),
            removable: false,
        };
        let id = default.id.clone();
        Self {
            lists: vec![default],
            tasks: Vec::new(),
            current_list_id: id.clone(),
            default_list_id: id,
        }
    }

    /// Store seeded from server-provided state. Validates the structural
    /// invariants: a single default list, a resolvable current pointer,
    /// no orphan tasks.
    pub fn from_parts(
        lists: Vec<List>,
        tasks: Vec<Task>,
        current_list_id: ListId,
    ) -> Result<Self, StoreError> {
        let mut defaults = lists.iter().filter(|l| !l.removable);
        let default_list_id = match (defaults.next(), defaults.next()) {
            (Some(default), None) => default.id.clone(),
            _ => return Err(StoreError::NoDefaultList),
        };
        if !lists.iter().any(|l| l.id == current_list_id) {
            return Err(StoreError::UnknownList(current_list_id));
        }
        if let Some(orphan) = tasks
            .iter()
            .find(|t| !lists.iter().any(|l| l.id == t.list_id))
        {
            return Err(StoreError::UnknownList(orphan.list_id.clone()));
        }
        Ok(Self {
            lists,
            tasks,
            current_list_id,
            default_list_id,
        })
    }

    pub fn lists(&self) -> &[List] {
        &self.lists
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn current_list_id(&self) -> &ListId {
        &self.current_list_id
    }

    pub fn default_list_id(&self) -> &ListId {
        &self.default_list_id
    }

    pub fn list(&self, id: &ListId) -> Option<&List> {
        self.lists.iter().find(|l| l.id == *id)
    }

    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == *id)
    }

    pub fn tasks_in<'a>(&'a self, list_id: &'a ListId) -> impl Iterator<Item = &'a Task> + 'a {
        self.tasks.iter().filter(move |t| t.list_id == *list_id)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            lists: self.lists.clone(),
            tasks: self.tasks.clone(),
            current_list_id: self.current_list_id.clone(),
        }
    }

    /// Insert a list under a temporary id, pending confirmation.
    pub fn add_list_tentative(&mut self, name: &str) -> ListId {
        let list = List::tentative(name);
        let id = list.id.clone();
        self.lists.push(list);
        id
    }

    /// Swap the tentative list's identity for the server-confirmed
    /// record. The current pointer and any tasks referencing the
    /// temporary id follow the new one.
    pub fn confirm_list(&mut self, temp_id: &ListId, record: ListRecord) -> Result<(), StoreError> {
        let slot = self
            .lists
            .iter_mut()
            .find(|l| l.id == *temp_id)
            .ok_or_else(|| StoreError::UnknownList(temp_id.clone()))?;
        let confirmed: List = record.into();
        let new_id = confirmed.id.clone();
        *slot = confirmed;
        if self.current_list_id == *temp_id {
            self.current_list_id = new_id.clone();
        }
        for task in self.tasks.iter_mut().filter(|t| t.list_id == *temp_id) {
            task.list_id = new_id.clone();
        }
        Ok(())
    }

    /// Delete a list and cascade-delete its tasks. If the removed list
    /// was active, the current pointer falls back to the default list.
    pub fn remove_list(&mut self, id: &ListId) -> Result<(), StoreError> {
        if *id == self.default_list_id {
            return Err(StoreError::DefaultListRemoval);
        }
        let before = self.lists.len();
        self.lists.retain(|l| l.id != *id);
        if self.lists.len() == before {
            return Err(StoreError::UnknownList(id.clone()));
        }
        self.tasks.retain(|t| t.list_id != *id);
        if self.current_list_id == *id {
            self.current_list_id = self.default_list_id.clone();
        }
        Ok(())
    }

    /// Insert a task under a temporary id, pending confirmation.
    pub fn add_task_tentative(&mut self, list_id: &ListId, text: &str) -> Result<TaskId, StoreError> {
        if self.list(list_id).is_none() {
            return Err(StoreError::UnknownList(list_id.clone()));
        }
        let task = Task::tentative(list_id.clone(), text);
        let id = task.id.clone();
        self.tasks.push(task);
        Ok(id)
    }

    /// Replace a task wholesale by its prior id: the temporary id gives
    /// way to the server record on add-confirm, and a toggle-confirm
    /// rewrites the same id with server-authoritative fields.
    pub fn confirm_task(&mut self, prior_id: &TaskId, record: TaskRecord) -> Result<(), StoreError> {
        let slot = self
            .tasks
            .iter_mut()
            .find(|t| t.id == *prior_id)
            .ok_or_else(|| StoreError::UnknownTask(prior_id.clone()))?;
        *slot = record.into();
        Ok(())
    }

    /// Drop a tentative task that failed to confirm.
    pub fn revert_add_task(&mut self, temp_id: &TaskId) -> Result<(), StoreError> {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != *temp_id);
        if self.tasks.len() == before {
            return Err(StoreError::UnknownTask(temp_id.clone()));
        }
        Ok(())
    }

    /// Flip a task's completion flag, returning the previous value for
    /// rollback. `touched` is left alone; the server stamps it on
    /// confirmation.
    pub fn set_task_completed_tentative(
        &mut self,
        id: &TaskId,
        completed: bool,
    ) -> Result<bool, StoreError> {
        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == *id)
            .ok_or_else(|| StoreError::UnknownTask(id.clone()))?;
        let previous = task.completed;
        task.completed = completed;
        Ok(previous)
    }

    /// Restore the completion flag captured before a failed toggle.
    pub fn revert_task_completed(&mut self, id: &TaskId, previous: bool) -> Result<(), StoreError> {
        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == *id)
            .ok_or_else(|| StoreError::UnknownTask(id.clone()))?;
        task.completed = previous;
        Ok(())
    }

    /// Remove a task, returning its exact record for a possible restore.
    pub fn remove_task_tentative(&mut self, id: &TaskId) -> Result<Task, StoreError> {
        let idx = self
            .tasks
            .iter()
            .position(|t| t.id == *id)
            .ok_or_else(|| StoreError::UnknownTask(id.clone()))?;
        Ok(self.tasks.remove(idx))
    }

    /// Re-insert the exact record captured before a failed removal,
    /// original `touched` included.
    pub fn restore_task(&mut self, snapshot: Task) {
        self.tasks.push(snapshot);
    }

    /// Move the active-list pointer. Purely local.
    pub fn set_current_list(&mut self, id: &ListId) -> Result<(), StoreError> {
        if self.list(id).is_none() {
            return Err(StoreError::UnknownList(id.clone()));
        }
        self.current_list_id = id.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn primary() -> List {
        List {
            id: ListId::new("1"),
            name: "Primary".to_string(),
            removable: false,
        }
    }

    fn seeded() -> Store {
        Store::from_parts(vec![primary()], Vec::new(), ListId::new("1")).unwrap()
    }

    fn record(id: &str, list: &str, text: &str) -> TaskRecord {
        TaskRecord {
            id: TaskId::new(id),
            list_id: ListId::new(list),
            text: text.to_string(),
            completed: false,
            touched: Utc::now(),
        }
    }

    #[test]
    fn with_default_list_seeds_state() {
        let store = Store::with_default_list("Primary");
        assert_eq!(store.lists().len(), 1);
        assert!(!store.lists()[0].removable);
        assert_eq!(store.current_list_id(), store.default_list_id());
        assert!(store.tasks().is_empty());
    }

    #[test]
    fn from_parts_rejects_missing_default_list() {
        let lists = vec![List {
            id: ListId::new("1"),
            name: "Primary".to_string(),
            removable: true,
        }];
        assert_eq!(
            Store::from_parts(lists, Vec::new(), ListId::new("1")).unwrap_err(),
            StoreError::NoDefaultList
        );
    }

    #[test]
    fn from_parts_rejects_dangling_current_pointer() {
        assert_eq!(
            Store::from_parts(vec![primary()], Vec::new(), ListId::new("9")).unwrap_err(),
            StoreError::UnknownList(ListId::new("9"))
        );
    }

    #[test]
    fn from_parts_rejects_orphan_tasks() {
        let orphan = Task::tentative(ListId::new("9"), "stray");
        assert_eq!(
            Store::from_parts(vec![primary()], vec![orphan], ListId::new("1")).unwrap_err(),
            StoreError::UnknownList(ListId::new("9"))
        );
    }

    #[test]
    fn confirm_task_swaps_temporary_identity() {
        let mut store = seeded();
        let temp = store.add_task_tentative(&ListId::new("1"), "Buy milk").unwrap();
        assert!(temp.as_str().starts_with("tmp-"));

        store.confirm_task(&temp, record("101", "1", "Buy milk")).unwrap();

        assert_eq!(store.tasks().len(), 1);
        assert_eq!(store.tasks()[0].id, TaskId::new("101"));
        assert!(store.task(&temp).is_none());
    }

    #[test]
    fn confirm_list_moves_current_pointer_and_tasks() {
        let mut store = seeded();
        let temp = store.add_list_tentative("Groceries");
        store.add_task_tentative(&temp, "Eggs").unwrap();
        store.set_current_list(&temp).unwrap();

        store
            .confirm_list(
                &temp,
                ListRecord {
                    id: ListId::new("2"),
                    name: "Groceries".to_string(),
                    removable: true,
                },
            )
            .unwrap();

        assert_eq!(store.current_list_id(), &ListId::new("2"));
        assert!(store.tasks().iter().all(|t| t.list_id == ListId::new("2")));
    }

    #[test]
    fn remove_list_cascades_and_resets_pointer() {
        let mut store = seeded();
        let temp = store.add_list_tentative("Groceries");
        store.add_task_tentative(&temp, "Eggs").unwrap();
        store.set_current_list(&temp).unwrap();

        store.remove_list(&temp).unwrap();

        assert_eq!(store.lists().len(), 1);
        assert!(store.tasks().is_empty());
        assert_eq!(store.current_list_id(), &ListId::new("1"));
    }

    #[test]
    fn remove_list_refuses_the_default_list() {
        let mut store = seeded();
        assert_eq!(
            store.remove_list(&ListId::new("1")),
            Err(StoreError::DefaultListRemoval)
        );
        assert_eq!(store.lists().len(), 1);
    }

    #[test]
    fn toggle_round_trip_restores_previous_value() {
        let mut store = seeded();
        let temp = store.add_task_tentative(&ListId::new("1"), "Buy milk").unwrap();
        store.confirm_task(&temp, record("101", "1", "Buy milk")).unwrap();
        let id = TaskId::new("101");

        let previous = store.set_task_completed_tentative(&id, true).unwrap();
        assert!(!previous);
        assert!(store.task(&id).unwrap().completed);

        store.revert_task_completed(&id, previous).unwrap();
        assert!(!store.task(&id).unwrap().completed);
    }

    #[test]
    fn remove_and_restore_keeps_exact_record() {
        let mut store = seeded();
        let temp = store.add_task_tentative(&ListId::new("1"), "Buy milk").unwrap();
        store.confirm_task(&temp, record("101", "1", "Buy milk")).unwrap();
        let original = store.task(&TaskId::new("101")).unwrap().clone();

        let snapshot = store.remove_task_tentative(&TaskId::new("101")).unwrap();
        assert!(store.tasks().is_empty());

        store.restore_task(snapshot);
        assert_eq!(store.task(&TaskId::new("101")), Some(&original));
    }

    #[test]
    fn set_current_list_rejects_unknown_id() {
        let mut store = seeded();
        assert_eq!(
            store.set_current_list(&ListId::new("9")),
            Err(StoreError::UnknownList(ListId::new("9")))
        );
        assert_eq!(store.current_list_id(), &ListId::new("1"));
    }

    #[test]
    fn add_task_requires_existing_list() {
        let mut store = seeded();
        assert_eq!(
            store.add_task_tentative(&ListId::new("9"), "stray"),
            Err(StoreError::UnknownList(ListId::new("9")))
        );
    }
}
