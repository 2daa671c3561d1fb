use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::Notify;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::api::Gateway;
use crate::controller::Controller;
use crate::message::{GatewayAction, GatewayCall, GatewayOutcome, Intent, Notice, PendingOp};
use crate::store::{Snapshot, Store};

#[derive(Default)]
struct Tracker {
    active: AtomicUsize,
    idle: Notify,
}

/// Event-loop glue between the view binding, the controller and the
/// gateway. Intents go in through [`Session::submit`]; validation and
/// rollback notices come out of [`Session::next_notice`]; state is read
/// through [`Session::snapshot`] and [`Session::pending`].
///
/// The controller only runs inside short synchronous critical sections;
/// suspension happens at the gateway await point alone, so any number of
/// operations may be in flight concurrently without a partially applied
/// mutation ever becoming visible. In-flight calls are never cancelled:
/// they resolve and reconcile even if their effect is off-screen by then.
pub struct Session<G: Gateway> {
    gateway: Arc<G>,
    controller: Arc<Mutex<Controller>>,
    notice_tx: UnboundedSender<Notice>,
    notice_rx: UnboundedReceiver<Notice>,
    tracker: Arc<Tracker>,
}

impl<G: Gateway> Session<G> {
    pub fn new(gateway: G, store: Store) -> Self {
        let (notice_tx, notice_rx) = mpsc::unbounded_channel();
        Self {
            gateway: Arc::new(gateway),
            controller: Arc::new(Mutex::new(Controller::new(store))),
            notice_tx,
            notice_rx,
            tracker: Arc::new(Tracker::default()),
        }
    }

    /// Feed one user intent through the controller. Must be called from
    /// within a tokio runtime; the gateway call, if any, is spawned onto
    /// it.
    pub fn submit(&self, intent: Intent) {
        let dispatch = {
            let mut controller = self.controller.lock().expect("controller mutex poisoned");
            controller.handle_intent(intent)
        };
        for notice in dispatch.notices {
            let _ = self.notice_tx.send(notice);
        }
        let Some(GatewayCall { op, action }) = dispatch.call else {
            return;
        };

        let gateway = Arc::clone(&self.gateway);
        let controller = Arc::clone(&self.controller);
        let notice_tx = self.notice_tx.clone();
        let tracker = Arc::clone(&self.tracker);
        tracker.active.fetch_add(1, Ordering::AcqRel);
        tokio::spawn(async move {
            let outcome = perform(gateway.as_ref(), action).await;
            let notices = {
                let mut controller = controller.lock().expect("controller mutex poisoned");
                controller.resolve(op, outcome)
            };
            for notice in notices {
                let _ = notice_tx.send(notice);
            }
            if tracker.active.fetch_sub(1, Ordering::AcqRel) == 1 {
                tracker.idle.notify_waiters();
            }
        });
    }

    /// Next controller notice, in emission order.
    pub async fn next_notice(&mut self) -> Option<Notice> {
        self.notice_rx.recv().await
    }

    /// Notice already queued, if any. Does not wait.
    pub fn try_notice(&mut self) -> Option<Notice> {
        self.notice_rx.try_recv().ok()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.controller
            .lock()
            .expect("controller mutex poisoned")
            .snapshot()
    }

    /// In-flight operation scopes, for disabling the affected controls.
    pub fn pending(&self) -> Vec<PendingOp> {
        self.controller
            .lock()
            .expect("controller mutex poisoned")
            .pending()
    }

    /// Wait until every spawned gateway call has been reconciled.
    pub async fn settled(&self) {
        loop {
            let idle = self.tracker.idle.notified();
            if self.tracker.active.load(Ordering::Acquire) == 0 {
                return;
            }
            idle.await;
        }
    }
}

async fn perform<G: Gateway>(gateway: &G, action: GatewayAction) -> GatewayOutcome {
    match action {
        GatewayAction::CreateList { name } => {
            GatewayOutcome::ListCreated(gateway.create_list(&name).await)
        }
        GatewayAction::DeleteList { id } => {
            GatewayOutcome::ListDeleted(gateway.delete_list(&id).await)
        }
        GatewayAction::CreateTask { list_id, text } => {
            GatewayOutcome::TaskCreated(gateway.create_task(&list_id, &text).await)
        }
        GatewayAction::UpdateTaskCompletion { id, completed } => {
            GatewayOutcome::TaskUpdated(gateway.update_task_completion(&id, completed).await)
        }
        GatewayAction::DeleteTask { id } => {
            GatewayOutcome::TaskDeleted(gateway.delete_task(&id).await)
        }
    }
}
