use std::fmt;

use uuid::Uuid;

use crate::api::{ListRecord, NetworkFailure, TaskRecord};
use crate::core::list::ListId;
use crate::core::task::TaskId;
use crate::core::validate::ValidationError;

/// A discrete user event forwarded by the view binding.
#[derive(Debug, Clone)]
pub enum Intent {
    AddTask { text: String },
    ToggleTask { id: TaskId },
    RemoveTask { id: TaskId },
    AddList { name: String },
    RemoveList { id: ListId },
    SelectList { id: ListId },
}

/// Which input a rejected name came from, so the view can surface the
/// message next to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameScope {
    ListName,
    TaskText { list_id: ListId },
}

/// Outbound controller events consumed by the view binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The intent never left the client; surfaced inline near the input.
    ValidationFailed {
        scope: NameScope,
        error: ValidationError,
    },
    /// A gateway call failed; any tentative change has been rolled back.
    NetworkFailure(NetworkFailure),
}

/// Identity of one operation instance, from intent to resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OpId(Uuid);

impl OpId {
    pub(crate) fn next() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for OpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The scope an in-flight operation holds. The view disables the matching
/// controls while one is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingOp {
    AddTask { list_id: ListId },
    ToggleTask { id: TaskId },
    RemoveTask { id: TaskId },
    AddList,
    RemoveList { id: ListId },
}

/// One gateway call requested by the controller; the driver performs it
/// and feeds the matching [`GatewayOutcome`] back under the same [`OpId`].
#[derive(Debug, Clone)]
pub struct GatewayCall {
    pub op: OpId,
    pub action: GatewayAction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayAction {
    CreateList { name: String },
    DeleteList { id: ListId },
    CreateTask { list_id: ListId, text: String },
    UpdateTaskCompletion { id: TaskId, completed: bool },
    DeleteTask { id: TaskId },
}

/// Resolution of a gateway call.
#[derive(Debug, Clone)]
pub enum GatewayOutcome {
    ListCreated(Result<ListRecord, NetworkFailure>),
    ListDeleted(Result<(), NetworkFailure>),
    TaskCreated(Result<TaskRecord, NetworkFailure>),
    TaskUpdated(Result<TaskRecord, NetworkFailure>),
    TaskDeleted(Result<(), NetworkFailure>),
}
