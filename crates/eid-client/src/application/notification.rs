//! Typed notifications and the listener capability.
//!
//! Every engine event the controller understands becomes exactly one
//! [`Notification`].  Listeners receive them through a single entry point,
//! [`WorkflowListener::on_notification`], and match on the variants they care
//! about.
//!
//! ```rust
//! use std::sync::Arc;
//! use eid_client::{Notification, WorkflowListener};
//!
//! let listener: Arc<dyn WorkflowListener> = Arc::new(|n: &Notification| {
//!     if let Notification::EnterPin { reader, .. } = n {
//!         println!("PIN requested on {}", reader.name);
//!     }
//! });
//! # let _ = listener;
//! ```

use std::sync::Arc;

use eid_core::{
    AccessRights, AuthResult, Cause, CertificateDescription, ChangePinResult, Reader, VersionInfo,
    WorkflowProgress, WrapperError,
};
use tokio::sync::mpsc;

/// One routed engine event, or an error synthesized by the adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// The engine session is ready; commands are accepted from now on.
    Started,

    /// The provider requests access rights.  Answer with `accept` or `cancel`.
    AccessRights {
        error: Option<String>,
        access_rights: Option<AccessRights>,
    },

    AuthenticationCompleted(AuthResult),

    AuthenticationStarted,

    /// The engine refused to start the authentication.
    AuthenticationStartFailed { error: String },

    /// A command was sent in a state that does not allow it.
    BadState { error: String },

    Certificate(CertificateDescription),

    ChangePinCompleted(ChangePinResult),

    ChangePinStarted,

    EnterCan {
        error: Option<String>,
        reader: Reader,
    },

    EnterNewPin {
        error: Option<String>,
        reader: Reader,
    },

    EnterPin {
        error: Option<String>,
        reader: Reader,
    },

    EnterPuk {
        error: Option<String>,
        reader: Reader,
    },

    Info(VersionInfo),

    /// No usable card is on a reader yet.
    InsertCard { error: Option<String> },

    /// The engine hit a defect of its own.
    InternalError { error: String },

    /// The workflow is paused until `continue_workflow` is called.
    Pause(Cause),

    /// `None` if an explicitly requested reader is unknown.
    Reader(Option<Reader>),

    ReaderList(Option<Vec<Reader>>),

    Status(WorkflowProgress),

    /// An error raised by the adapter, not the engine.
    WrapperError(WrapperError),
}

impl Notification {
    /// Short variant name for log lines.
    pub fn name(&self) -> &'static str {
        match self {
            Notification::Started => "Started",
            Notification::AccessRights { .. } => "AccessRights",
            Notification::AuthenticationCompleted(_) => "AuthenticationCompleted",
            Notification::AuthenticationStarted => "AuthenticationStarted",
            Notification::AuthenticationStartFailed { .. } => "AuthenticationStartFailed",
            Notification::BadState { .. } => "BadState",
            Notification::Certificate(_) => "Certificate",
            Notification::ChangePinCompleted(_) => "ChangePinCompleted",
            Notification::ChangePinStarted => "ChangePinStarted",
            Notification::EnterCan { .. } => "EnterCan",
            Notification::EnterNewPin { .. } => "EnterNewPin",
            Notification::EnterPin { .. } => "EnterPin",
            Notification::EnterPuk { .. } => "EnterPuk",
            Notification::Info(_) => "Info",
            Notification::InsertCard { .. } => "InsertCard",
            Notification::InternalError { .. } => "InternalError",
            Notification::Pause(_) => "Pause",
            Notification::Reader(_) => "Reader",
            Notification::ReaderList(_) => "ReaderList",
            Notification::Status(_) => "Status",
            Notification::WrapperError(_) => "WrapperError",
        }
    }
}

// ── Listener capability ───────────────────────────────────────────────────────

/// Receives workflow notifications.
///
/// Calls arrive one at a time, in engine order, on the controller's delivery
/// task.  Implementations should return quickly; calling back into the
/// controller from here is fine because every command is fire-and-forget.
pub trait WorkflowListener: Send + Sync {
    fn on_notification(&self, notification: &Notification);
}

impl<F> WorkflowListener for F
where
    F: Fn(&Notification) + Send + Sync,
{
    fn on_notification(&self, notification: &Notification) {
        self(notification)
    }
}

/// A listener that forwards every notification into an unbounded channel.
///
/// Useful for applications that prefer to `await` notifications in a loop.
pub struct ChannelListener {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelListener {
    /// Creates the listener and the receiving end of its channel.
    ///
    /// The listener stays registered only as long as the returned `Arc` is
    /// kept alive.
    pub fn new() -> (Arc<dyn WorkflowListener>, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(ChannelListener { tx }), rx)
    }
}

impl WorkflowListener for ChannelListener {
    fn on_notification(&self, notification: &Notification) {
        // A dropped receiver just means nobody is listening any more.
        let _ = self.tx.send(notification.clone());
    }
}
