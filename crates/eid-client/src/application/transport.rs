//! The transport port: how the controller reaches the engine.
//!
//! The controller never opens sockets or spawns the engine itself.  It is
//! handed an `Arc<dyn Transport>` and only ever calls the four methods below.
//! Inbound traffic flows the other way through [`SessionEvents`], which the
//! controller passes to [`Transport::start`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Errors a transport can report.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The engine could not be reached.
    #[error("failed to connect to engine at {url}: {reason}")]
    ConnectFailed { url: String, reason: String },

    /// The engine did not accept the connection in time.
    #[error("connecting to engine timed out after {0:?}")]
    ConnectTimeout(Duration),

    /// A send was attempted while the link is down.
    #[error("transport is not active")]
    NotActive,

    /// The engine side of the link has gone away.
    #[error("engine link closed")]
    Closed,

    /// Any other failure of the underlying link.
    #[error("link error: {0}")]
    Link(String),
}

/// Callbacks a transport invokes for inbound traffic.
///
/// Implementations must be cheap and non-blocking; they run on whatever
/// thread or task the transport receives on.
pub trait SessionEvents: Send + Sync {
    /// The engine session is ready to accept commands.
    fn on_session_ready(&self);

    /// One complete raw event from the engine.
    fn on_message(&self, payload: &[u8]);
}

/// A link to the eID engine.
///
/// `is_active` is the single source of truth for whether commands may be
/// sent; the controller keeps no started flag of its own.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Opens the link and starts delivering inbound traffic to `events`.
    async fn start(&self, events: Arc<dyn SessionEvents>) -> Result<(), TransportError>;

    /// Closes the link.  No callbacks are made after this returns.
    async fn stop(&self) -> Result<(), TransportError>;

    /// Returns `true` while commands can be sent.
    fn is_active(&self) -> bool;

    /// Sends one fully serialized command.
    async fn send(&self, payload: String) -> Result<(), TransportError>;
}
