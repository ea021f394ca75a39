//! The engine's payload-less "ready" convention.
//!
//! An engine link delivers either a raw event payload or nothing at all.  A
//! payload-less delivery that arrives before the session is ready and before
//! any real message means "the engine is ready for commands".  A payload-less
//! delivery at any other time has no meaning and is dropped.
//!
//! [`NullReadyFraming`] sits between a link and the controller's
//! [`SessionEvents`] and applies that rule, so the controller only ever sees
//! `on_session_ready` once per session followed by real messages.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use crate::application::transport::SessionEvents;

/// Per-session state of the ready convention.
#[derive(Debug, Default)]
pub struct NullReadyFraming {
    ready: AtomicBool,
    seen_message: AtomicBool,
}

impl NullReadyFraming {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forwards one delivery from the link to `events`.
    pub fn deliver(&self, payload: Option<&[u8]>, events: &dyn SessionEvents) {
        match payload {
            Some(bytes) => {
                self.seen_message.store(true, Ordering::SeqCst);
                events.on_message(bytes);
            }
            None if self.seen_message.load(Ordering::SeqCst) => {
                debug!("ignoring payload-less delivery after first message");
            }
            None => {
                if self
                    .ready
                    .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                    .is_ok()
                {
                    events.on_session_ready();
                } else {
                    debug!("ignoring repeated ready signal");
                }
            }
        }
    }

    /// `true` once the ready signal has been forwarded.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    /// Forgets the current session so the next link can signal ready again.
    pub fn reset(&self) {
        self.ready.store(false, Ordering::SeqCst);
        self.seen_message.store(false, Ordering::SeqCst);
    }
}
