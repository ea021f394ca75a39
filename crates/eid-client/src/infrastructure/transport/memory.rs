//! In-process engine link.
//!
//! [`InMemoryTransport::pair`] returns the two ends of one link:
//!
//! - the [`InMemoryTransport`], handed to a
//!   [`WorkflowController`](crate::WorkflowController);
//! - the [`EngineHandle`], which plays the engine.  It receives every
//!   serialized command and pushes raw event payloads back.
//!
//! Integration tests use the pair to script complete workflows without a
//! running engine.  Applications that host an engine in-process can use it
//! the same way.
//!
//! Starting the transport performs the engine's initial payload-less
//! delivery, which [`NullReadyFraming`] turns into the ready signal.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::application::transport::{SessionEvents, Transport, TransportError};
use crate::infrastructure::transport::framing::NullReadyFraming;

struct Shared {
    active: AtomicBool,
    events: Mutex<Option<Arc<dyn SessionEvents>>>,
    framing: NullReadyFraming,
    commands: mpsc::UnboundedSender<String>,
}

impl Shared {
    fn events(&self) -> Option<Arc<dyn SessionEvents>> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_events(&self, events: Option<Arc<dyn SessionEvents>>) {
        *self.events.lock().unwrap_or_else(PoisonError::into_inner) = events;
    }

    fn deliver(&self, payload: Option<&[u8]>) {
        // Cloned out of the lock; the controller may call back into us.
        match self.events() {
            Some(events) => self.framing.deliver(payload, events.as_ref()),
            None => debug!("no session attached, dropping engine delivery"),
        }
    }
}

/// Controller side of an in-process link.
pub struct InMemoryTransport {
    shared: Arc<Shared>,
}

/// Engine side of an in-process link.
pub struct EngineHandle {
    shared: Arc<Shared>,
    commands: mpsc::UnboundedReceiver<String>,
}

impl InMemoryTransport {
    /// Creates a connected transport/engine pair.
    pub fn pair() -> (InMemoryTransport, EngineHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let shared = Arc::new(Shared {
            active: AtomicBool::new(false),
            events: Mutex::new(None),
            framing: NullReadyFraming::new(),
            commands: tx,
        });
        (
            InMemoryTransport {
                shared: Arc::clone(&shared),
            },
            EngineHandle {
                shared,
                commands: rx,
            },
        )
    }
}

#[async_trait]
impl Transport for InMemoryTransport {
    async fn start(&self, events: Arc<dyn SessionEvents>) -> Result<(), TransportError> {
        if self.shared.commands.is_closed() {
            return Err(TransportError::Closed);
        }
        self.shared.framing.reset();
        self.shared.set_events(Some(events));
        self.shared.active.store(true, Ordering::SeqCst);
        info!("in-memory engine link started");

        self.shared.deliver(None);
        Ok(())
    }

    async fn stop(&self) -> Result<(), TransportError> {
        self.shared.active.store(false, Ordering::SeqCst);
        self.shared.set_events(None);
        info!("in-memory engine link stopped");
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.shared.active.load(Ordering::SeqCst)
    }

    async fn send(&self, payload: String) -> Result<(), TransportError> {
        if !self.is_active() {
            return Err(TransportError::NotActive);
        }
        self.shared
            .commands
            .send(payload)
            .map_err(|_| TransportError::Closed)
    }
}

impl EngineHandle {
    /// Waits for the next serialized command.  `None` once the transport is
    /// gone.
    pub async fn next_command(&mut self) -> Option<String> {
        self.commands.recv().await
    }

    /// Returns the next serialized command if one is already queued.
    pub fn try_next_command(&mut self) -> Option<String> {
        self.commands.try_recv().ok()
    }

    /// Delivers a raw payload, or the payload-less signal for `None`.
    pub fn deliver(&self, payload: Option<&str>) {
        self.shared.deliver(payload.map(str::as_bytes));
    }

    /// Delivers one raw event payload.
    pub fn emit(&self, json: &str) {
        self.deliver(Some(json));
    }

    /// Delivers `event` serialized as JSON.
    pub fn emit_json(&self, event: &serde_json::Value) {
        self.emit(&event.to_string());
    }

    /// Simulates the engine going away.  The transport turns inactive and
    /// nothing more is delivered.
    pub fn close(&self) {
        self.shared.active.store(false, Ordering::SeqCst);
        self.shared.set_events(None);
        info!("in-memory engine closed the link");
    }
}
