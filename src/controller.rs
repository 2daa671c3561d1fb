use std::collections::HashMap;

use crate::api::NetworkFailure;
use crate::core::list::ListId;
use crate::core::task::{Task, TaskId};
use crate::core::validate::validate_name;
use crate::message::{
    GatewayAction, GatewayCall, GatewayOutcome, Intent, NameScope, Notice, OpId, PendingOp,
};
use crate::store::{Snapshot, Store, StoreError};

/// Captured pre-state that reverses a tentative mutation exactly.
#[derive(Debug, Clone)]
enum Undo {
    DropTentativeList { temp_id: ListId },
    DropTentativeTask { temp_id: TaskId },
    RestoreCompleted { id: TaskId, previous: bool },
    RestoreTask { snapshot: Task },
    /// List removal applies nothing optimistically; there is nothing to
    /// revert.
    Nothing,
}

#[derive(Debug)]
struct Operation {
    scope: PendingOp,
    undo: Undo,
}

/// Result of the synchronous half of an intent: notices for the view
/// plus at most one gateway call for the driver to perform.
#[derive(Debug, Default)]
pub struct Dispatch {
    pub notices: Vec<Notice>,
    pub call: Option<GatewayCall>,
}

impl Dispatch {
    fn none() -> Self {
        Self::default()
    }

    fn rejected(notice: Notice) -> Self {
        Self {
            notices: vec![notice],
            call: None,
        }
    }

    fn call(call: GatewayCall) -> Self {
        Self {
            notices: Vec::new(),
            call: Some(call),
        }
    }
}

/// The optimistic operation controller. Each intent becomes an operation
/// instance: validate, apply the tentative store mutation, hand the
/// gateway call to the driver, then reconcile the outcome: confirm the
/// tentative record with server identity, or roll it back from the
/// captured undo data. The sole writer of the store.
///
/// Same-entity races resolve last-confirmed-wins: a reconciliation whose
/// target was removed by an earlier-resolving operation is dropped as a
/// no-op.
pub struct Controller {
    store: Store,
    in_flight: HashMap<OpId, Operation>,
}

impl Controller {
    pub fn new(store: Store) -> Self {
        Self {
            store,
            in_flight: HashMap::new(),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        self.store.snapshot()
    }

    /// In-flight operation scopes, for disabling the affected controls.
    pub fn pending(&self) -> Vec<PendingOp> {
        self.in_flight.values().map(|op| op.scope.clone()).collect()
    }

    /// Run the synchronous phases of one intent: validation and the
    /// tentative store mutation. Never suspends.
    pub fn handle_intent(&mut self, intent: Intent) -> Dispatch {
        match intent {
            Intent::AddTask { text } => self.add_task(text),
            Intent::ToggleTask { id } => self.toggle_task(id),
            Intent::RemoveTask { id } => self.remove_task(id),
            Intent::AddList { name } => self.add_list(name),
            Intent::RemoveList { id } => self.remove_list(id),
            Intent::SelectList { id } => self.select_list(id),
        }
    }

    fn add_task(&mut self, text: String) -> Dispatch {
        let op = OpId::next();
        // Duplicate scope and eventual attachment are both the list that
        // is active now, even if the user switches lists mid-flight.
        let list_id = self.store.current_list_id().clone();
        let taken: Vec<String> = self
            .store
            .tasks_in(&list_id)
            .map(|t| t.text.clone())
            .collect();
        if let Err(error) = validate_name(&text, taken.iter().map(String::as_str)) {
            log::debug!("op {op}: add task rejected: {error}");
            return Dispatch::rejected(Notice::ValidationFailed {
                scope: NameScope::TaskText { list_id },
                error,
            });
        }
        let temp_id = match self.store.add_task_tentative(&list_id, &text) {
            Ok(id) => id,
            Err(err) => return self.abort(op, err),
        };
        log::debug!("op {op}: add task {temp_id} to {list_id} pending");
        self.begin(
            op,
            PendingOp::AddTask {
                list_id: list_id.clone(),
            },
            Undo::DropTentativeTask { temp_id },
        );
        Dispatch::call(GatewayCall {
            op,
            action: GatewayAction::CreateTask { list_id, text },
        })
    }

    fn toggle_task(&mut self, id: TaskId) -> Dispatch {
        let op = OpId::next();
        let Some(task) = self.store.task(&id) else {
            log::error!("op {op}: toggle of unknown task {id}");
            return Dispatch::none();
        };
        let completed = !task.completed;
        let previous = match self.store.set_task_completed_tentative(&id, completed) {
            Ok(prev) => prev,
            Err(err) => return self.abort(op, err),
        };
        log::debug!("op {op}: toggle {id} -> {completed} pending");
        self.begin(
            op,
            PendingOp::ToggleTask { id: id.clone() },
            Undo::RestoreCompleted {
                id: id.clone(),
                previous,
            },
        );
        Dispatch::call(GatewayCall {
            op,
            action: GatewayAction::UpdateTaskCompletion { id, completed },
        })
    }

    fn remove_task(&mut self, id: TaskId) -> Dispatch {
        let op = OpId::next();
        let snapshot = match self.store.remove_task_tentative(&id) {
            Ok(task) => task,
            Err(err) => return self.abort(op, err),
        };
        log::debug!("op {op}: remove task {id} pending");
        self.begin(
            op,
            PendingOp::RemoveTask { id: id.clone() },
            Undo::RestoreTask { snapshot },
        );
        Dispatch::call(GatewayCall {
            op,
            action: GatewayAction::DeleteTask { id },
        })
    }

    fn add_list(&mut self, name: String) -> Dispatch {
        let op = OpId::next();
        let taken: Vec<String> = self.store.lists().iter().map(|l| l.name.clone()).collect();
        if let Err(error) = validate_name(&name, taken.iter().map(String::as_str)) {
            log::debug!("op {op}: add list rejected: {error}");
            return Dispatch::rejected(Notice::ValidationFailed {
                scope: NameScope::ListName,
                error,
            });
        }
        let temp_id = self.store.add_list_tentative(&name);
        log::debug!("op {op}: add list {temp_id} pending");
        self.begin(op, PendingOp::AddList, Undo::DropTentativeList { temp_id });
        Dispatch::call(GatewayCall {
            op,
            action: GatewayAction::CreateList { name },
        })
    }

    fn remove_list(&mut self, id: ListId) -> Dispatch {
        let op = OpId::next();
        // Precondition, not validation: the default list is never a
        // removal target, and no notice or call is produced for it.
        if *self.store.default_list_id() == id {
            log::warn!("op {op}: refusing to remove the default list");
            return Dispatch::none();
        }
        if self.store.list(&id).is_none() {
            log::error!("op {op}: remove of unknown list {id}");
            return Dispatch::none();
        }
        // The list stays in place until the server confirms; its
        // controls are disabled through the pending scope meanwhile.
        log::debug!("op {op}: remove list {id} pending");
        self.begin(
            op,
            PendingOp::RemoveList { id: id.clone() },
            Undo::Nothing,
        );
        Dispatch::call(GatewayCall {
            op,
            action: GatewayAction::DeleteList { id },
        })
    }

    fn select_list(&mut self, id: ListId) -> Dispatch {
        if let Err(err) = self.store.set_current_list(&id) {
            log::error!("select list: {err}");
        }
        Dispatch::none()
    }

    /// Reconcile one pending operation against its gateway outcome.
    pub fn resolve(&mut self, op: OpId, outcome: GatewayOutcome) -> Vec<Notice> {
        let Some(operation) = self.in_flight.remove(&op) else {
            log::error!("op {op}: resolution for unknown operation");
            return Vec::new();
        };
        match outcome {
            GatewayOutcome::ListCreated(Ok(record)) => {
                let Undo::DropTentativeList { temp_id } = &operation.undo else {
                    log::error!("op {op}: outcome does not match operation");
                    return Vec::new();
                };
                let confirmed_id = record.id.clone();
                match self.store.confirm_list(temp_id, record) {
                    Ok(()) => {
                        // Create-and-activate: a confirmed new list
                        // becomes the active one.
                        if let Err(err) = self.store.set_current_list(&confirmed_id) {
                            log::error!("op {op}: activate confirmed list: {err}");
                        }
                        log::debug!("op {op}: confirmed as {confirmed_id}");
                    }
                    Err(StoreError::UnknownList(_)) => {
                        log::debug!("op {op}: tentative list gone before confirmation, dropping");
                    }
                    Err(err) => log::error!("op {op}: confirm list: {err}"),
                }
                Vec::new()
            }
            GatewayOutcome::ListDeleted(Ok(())) => {
                let PendingOp::RemoveList { id } = &operation.scope else {
                    log::error!("op {op}: outcome does not match operation");
                    return Vec::new();
                };
                match self.store.remove_list(id) {
                    Ok(()) => log::debug!("op {op}: confirmed"),
                    Err(StoreError::UnknownList(_)) => {
                        log::debug!("op {op}: list already gone, dropping");
                    }
                    Err(err) => log::error!("op {op}: remove list: {err}"),
                }
                Vec::new()
            }
            GatewayOutcome::TaskCreated(Ok(record)) | GatewayOutcome::TaskUpdated(Ok(record)) => {
                let prior_id = match &operation.undo {
                    Undo::DropTentativeTask { temp_id } => temp_id,
                    Undo::RestoreCompleted { id, .. } => id,
                    _ => {
                        log::error!("op {op}: outcome does not match operation");
                        return Vec::new();
                    }
                };
                match self.store.confirm_task(prior_id, record) {
                    Ok(()) => log::debug!("op {op}: confirmed"),
                    Err(StoreError::UnknownTask(_)) => {
                        log::debug!("op {op}: task gone before confirmation, dropping");
                    }
                    Err(err) => log::error!("op {op}: confirm task: {err}"),
                }
                Vec::new()
            }
            GatewayOutcome::TaskDeleted(Ok(())) => {
                // The task already left the store tentatively.
                log::debug!("op {op}: confirmed");
                Vec::new()
            }
            GatewayOutcome::ListCreated(Err(failure))
            | GatewayOutcome::ListDeleted(Err(failure))
            | GatewayOutcome::TaskCreated(Err(failure))
            | GatewayOutcome::TaskUpdated(Err(failure))
            | GatewayOutcome::TaskDeleted(Err(failure)) => self.roll_back(op, operation, failure),
        }
    }

    fn roll_back(&mut self, op: OpId, operation: Operation, failure: NetworkFailure) -> Vec<Notice> {
        match operation.undo {
            Undo::DropTentativeList { temp_id } => {
                match self.store.remove_list(&temp_id) {
                    Ok(()) | Err(StoreError::UnknownList(_)) => {}
                    Err(err) => log::error!("op {op}: rollback: {err}"),
                }
            }
            Undo::DropTentativeTask { temp_id } => {
                if self.store.revert_add_task(&temp_id).is_err() {
                    log::debug!("op {op}: tentative task already gone");
                }
            }
            Undo::RestoreCompleted { id, previous } => {
                if self.store.revert_task_completed(&id, previous).is_err() {
                    log::debug!("op {op}: task gone before rollback, dropping");
                }
            }
            Undo::RestoreTask { snapshot } => {
                // The owning list may have been removed while the delete
                // was in flight; restoring then would orphan the task.
                if self.store.list(&snapshot.list_id).is_some() {
                    self.store.restore_task(snapshot);
                } else {
                    log::debug!("op {op}: owning list gone, dropping restore");
                }
            }
            Undo::Nothing => {}
        }
        log::debug!("op {op}: rolled back: {failure}");
        vec![Notice::NetworkFailure(failure)]
    }

    fn begin(&mut self, op: OpId, scope: PendingOp, undo: Undo) {
        self.in_flight.insert(op, Operation { scope, undo });
    }

    fn abort(&mut self, op: OpId, err: StoreError) -> Dispatch {
        log::error!("op {op}: aborted: {err}");
        Dispatch::none()
    }
}
