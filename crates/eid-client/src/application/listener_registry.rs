//! Ordered, weakly-held set of workflow listeners.
//!
//! The registry never keeps a listener alive: it stores [`Weak`] handles and
//! skips or prunes entries whose listener has been dropped.  Identity is the
//! address of the listener allocation, so registering the same `Arc` twice is
//! a no-op while two separately allocated listeners are always distinct.
//!
//! Each registration gets a [`ListenerToken`].  The delivery task checks the
//! token again right before calling a listener, which is what makes
//! `unregister` take effect for deliveries that are already queued.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tracing::{debug, info};

use crate::application::notification::WorkflowListener;

/// Handle identifying one registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerToken(u64);

struct Entry {
    token: ListenerToken,
    listener: Weak<dyn WorkflowListener>,
}

impl Entry {
    fn is_alive(&self) -> bool {
        self.listener.strong_count() > 0
    }

    /// A dead entry never equals a live listener, even if the address was reused.
    fn is(&self, listener: &Arc<dyn WorkflowListener>) -> bool {
        self.is_alive() && self.listener.as_ptr() as *const () == Arc::as_ptr(listener) as *const ()
    }
}

#[derive(Default)]
struct RegistryState {
    next_token: u64,
    entries: Vec<Entry>,
}

impl RegistryState {
    fn prune(&mut self) {
        let before = self.entries.len();
        self.entries.retain(Entry::is_alive);
        let pruned = before - self.entries.len();
        if pruned > 0 {
            debug!(pruned, "dropped listeners removed from registry");
        }
    }
}

/// The listener set shared by the controller and its delivery task.
#[derive(Default)]
pub struct ListenerRegistry {
    state: Mutex<RegistryState>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        // Listener code never runs under this lock, so poisoning cannot leave
        // the entry list half-updated.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds `listener` unless it is already registered.
    ///
    /// Returns the token of the new or the existing registration.
    pub fn register(&self, listener: &Arc<dyn WorkflowListener>) -> ListenerToken {
        let mut state = self.lock();
        state.prune();

        if let Some(existing) = state.entries.iter().find(|entry| entry.is(listener)) {
            info!(token = existing.token.0, "listener already registered");
            return existing.token;
        }

        let token = ListenerToken(state.next_token);
        state.next_token += 1;
        state.entries.push(Entry {
            token,
            listener: Arc::downgrade(listener),
        });
        token
    }

    /// Removes `listener` along with every dead entry.
    ///
    /// Returns `true` if `listener` was registered.
    pub fn unregister(&self, listener: &Arc<dyn WorkflowListener>) -> bool {
        let mut state = self.lock();
        let before = state.entries.len();
        state.entries.retain(|entry| !entry.is(listener));
        let removed = state.entries.len() < before;
        state.prune();
        removed
    }

    /// Removes the registration behind `token` along with every dead entry.
    pub fn unregister_token(&self, token: ListenerToken) -> bool {
        let mut state = self.lock();
        let before = state.entries.len();
        state.entries.retain(|entry| entry.token != token);
        let removed = state.entries.len() < before;
        state.prune();
        removed
    }

    /// Returns `true` while `token` refers to a current registration.
    pub fn is_registered(&self, token: ListenerToken) -> bool {
        self.lock()
            .entries
            .iter()
            .any(|entry| entry.token == token && entry.is_alive())
    }

    /// Prunes dead entries and returns the live ones in registration order.
    pub fn snapshot(&self) -> Vec<(ListenerToken, Weak<dyn WorkflowListener>)> {
        let mut state = self.lock();
        state.prune();
        state
            .entries
            .iter()
            .map(|entry| (entry.token, Weak::clone(&entry.listener)))
            .collect()
    }

    /// Number of live listeners.
    pub fn len(&self) -> usize {
        self.lock().entries.iter().filter(|entry| entry.is_alive()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
