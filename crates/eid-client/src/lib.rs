//! eid-client library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/` and
//! embedding applications share the same module tree.
//!
//! # What does eid-client do? (for beginners)
//!
//! Reading a German eID card is not done by this crate.  It is done by an
//! **engine**, a separately running service that owns the card reader, speaks
//! the cryptographic card protocols and talks to the service provider.  The
//! engine is remote-controlled through a small JSON protocol: the application
//! sends commands (`RUN_AUTH`, `SET_PIN`, `ACCEPT`, …) and the engine answers
//! with events (`ACCESS_RIGHTS`, `ENTER_PIN`, `AUTH`, …).
//!
//! This crate turns that loose protocol into a typed API:
//!
//! 1. The application calls methods on a [`WorkflowController`]
//!    (`start_authentication`, `set_pin`, …).  Each call is checked against
//!    the link state, serialized and sent in the background.
//! 2. Raw events coming back from the engine are decoded and routed to
//!    exactly one typed [`Notification`] each.
//! 3. Notifications are delivered in arrival order to every registered
//!    [`WorkflowListener`] on a dedicated delivery task.
//!
//! How bytes reach the engine is pluggable through the [`Transport`] port:
//! an in-process link for tests and embedding, and a WebSocket link for an
//! engine listening on localhost.

/// Application layer: the controller, routing, listeners and the transport port.
pub mod application;

/// Infrastructure layer: transport implementations, configuration, tracing.
pub mod infrastructure;

pub use application::listener_registry::ListenerToken;
pub use application::notification::{ChannelListener, Notification, WorkflowListener};
pub use application::options::{AuthenticationOptions, ChangePinOptions};
pub use application::transport::{SessionEvents, Transport, TransportError};
pub use application::workflow_controller::WorkflowController;
