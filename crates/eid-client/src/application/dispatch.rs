//! FIFO delivery of notifications to listeners.
//!
//! Notifications are produced on whatever thread the transport receives on,
//! or on the caller's thread for precondition errors.  They are not delivered
//! there.  Instead each one is queued, together with the listeners that were
//! registered at that moment, and a single tokio task calls the listeners in
//! queue order.  Listeners therefore never see two notifications at once and
//! always see them in the order the engine sent them.
//!
//! Right before each call the task re-checks that the listener is still
//! registered and still alive; an `unregister` that happens before delivery
//! wins.  A panicking listener is logged and skipped; the others still get
//! the notification.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Weak};

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, error};

use crate::application::listener_registry::{ListenerRegistry, ListenerToken};
use crate::application::notification::{Notification, WorkflowListener};

struct Job {
    notification: Notification,
    targets: Vec<(ListenerToken, Weak<dyn WorkflowListener>)>,
}

/// Sending side of the delivery task.  Dropping it ends the task once the
/// queue has drained.
pub struct NotificationQueue {
    tx: mpsc::UnboundedSender<Job>,
}

impl NotificationQueue {
    /// Spawns the delivery task on `runtime`.
    pub fn spawn(runtime: &Handle, registry: Arc<ListenerRegistry>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        runtime.spawn(run(rx, registry));
        Self { tx }
    }

    /// Queues `notification` for every listener registered right now.
    pub fn publish(&self, registry: &ListenerRegistry, notification: Notification) {
        let targets = registry.snapshot();
        if targets.is_empty() {
            debug!(notification = notification.name(), "no listeners registered");
            return;
        }

        if self.tx.send(Job { notification, targets }).is_err() {
            error!("notification delivery task is gone");
        }
    }
}

async fn run(mut rx: mpsc::UnboundedReceiver<Job>, registry: Arc<ListenerRegistry>) {
    while let Some(job) = rx.recv().await {
        deliver(&job, &registry);
    }
    debug!("notification delivery task finished");
}

fn deliver(job: &Job, registry: &ListenerRegistry) {
    for (token, weak) in &job.targets {
        if !registry.is_registered(*token) {
            continue;
        }
        let Some(listener) = weak.upgrade() else {
            continue;
        };

        let outcome = catch_unwind(AssertUnwindSafe(|| {
            listener.on_notification(&job.notification);
        }));
        if outcome.is_err() {
            error!(
                ?token,
                notification = job.notification.name(),
                "listener panicked while handling notification"
            );
        }
    }
}
