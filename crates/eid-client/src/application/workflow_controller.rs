//! WorkflowController: the application-facing API of the eID client.
//!
//! The controller owns a [`Transport`] and a listener registry.  Its job is
//! small but strict:
//!
//! - **Outbound.**  Every workflow method builds one [`Command`], checks that
//!   the transport is active, serializes the command and hands it to the
//!   transport on a background task.  The method returns immediately; there is
//!   no per-command acknowledgement.  If the transport is not active nothing
//!   is sent and every listener receives a `WrapperError` naming the command.
//!   A single writer task drains the outbox, so commands reach the transport
//!   in call order and one at a time.
//!
//! - **Inbound.**  Raw engine payloads are decoded, routed to one
//!   [`Notification`] and queued for FIFO delivery to every listener.
//!   Payloads that do not decode are logged and dropped.  Unknown tags are
//!   logged and dropped.
//!
//! The controller is a cheap-to-clone handle; clones share the same transport
//! and listeners.
//!
//! # Correlation
//!
//! Commands and events are not correlated by any id.  After `set_pin` the
//! engine simply emits whatever comes next in its workflow (`AUTH`,
//! `ENTER_PIN` with a lower retry counter, `ENTER_CAN`, …).

use std::sync::{Arc, Weak};

use eid_core::{decode_event, encode_command, AccessRight, Command, Simulator, WrapperError};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::application::dispatch::NotificationQueue;
use crate::application::listener_registry::{ListenerRegistry, ListenerToken};
use crate::application::notification::{Notification, WorkflowListener};
use crate::application::options::{AuthenticationOptions, ChangePinOptions};
use crate::application::router::route;
use crate::application::transport::{SessionEvents, Transport};

/// Error text of the `WrapperError` emitted for commands sent while stopped.
pub const NOT_STARTED: &str = "eID workflow controller not started";

/// `WrapperError::msg` used when the transport fails to start.
pub const START_TAG: &str = "START";

/// `WrapperError::msg` used when the transport fails to stop.
pub const STOP_TAG: &str = "STOP";

/// One serialized command waiting for the writer task.
struct Outgoing {
    tag: &'static str,
    payload: String,
}

struct Inner {
    transport: Arc<dyn Transport>,
    registry: Arc<ListenerRegistry>,
    queue: NotificationQueue,
    outbox: mpsc::UnboundedSender<Outgoing>,
}

impl Inner {
    fn notify(&self, notification: Notification) {
        self.queue.publish(&self.registry, notification);
    }

    fn handle_message(&self, payload: &[u8]) {
        let event = match decode_event(payload) {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, "dropping undecodable engine message");
                return;
            }
        };
        debug!(msg = %event.msg, "engine event received");

        match route(&event) {
            Some(Notification::WrapperError(err)) => {
                warn!(msg = %err.msg, error = %err.error, "engine event mapped to wrapper error");
                self.notify(Notification::WrapperError(err));
            }
            Some(notification) => self.notify(notification),
            None => info!(msg = %event.msg, "received unknown engine message"),
        }
    }
}

async fn write_commands(mut rx: mpsc::UnboundedReceiver<Outgoing>, transport: Arc<dyn Transport>) {
    while let Some(Outgoing { tag, payload }) = rx.recv().await {
        if let Err(e) = transport.send(payload).await {
            warn!(cmd = tag, error = %e, "failed to send command");
        }
    }
    debug!("command writer task finished");
}

/// Inbound sink handed to the transport.  Holds the controller weakly so a
/// transport outliving the controller cannot keep it alive.
struct SessionSink {
    inner: Weak<Inner>,
}

impl SessionEvents for SessionSink {
    fn on_session_ready(&self) {
        if let Some(inner) = self.inner.upgrade() {
            info!("engine session ready");
            inner.notify(Notification::Started);
        }
    }

    fn on_message(&self, payload: &[u8]) {
        if let Some(inner) = self.inner.upgrade() {
            inner.handle_message(payload);
        }
    }
}

/// Controls authentication and PIN change workflows on the eID engine.
#[derive(Clone)]
pub struct WorkflowController {
    inner: Arc<Inner>,
}

impl WorkflowController {
    /// Creates a controller over `transport`.
    ///
    /// The command writer and the listener delivery task run on `runtime`.
    pub fn new(transport: Arc<dyn Transport>, runtime: Handle) -> Self {
        let registry = Arc::new(ListenerRegistry::new());
        let queue = NotificationQueue::spawn(&runtime, Arc::clone(&registry));
        let (outbox, rx) = mpsc::unbounded_channel();
        runtime.spawn(write_commands(rx, Arc::clone(&transport)));
        Self {
            inner: Arc::new(Inner {
                transport,
                registry,
                queue,
                outbox,
            }),
        }
    }

    // ── Listeners ─────────────────────────────────────────────────────────────

    /// Registers `listener`.  The controller holds it weakly: drop the last
    /// `Arc` and it stops receiving notifications.
    pub fn register(&self, listener: &Arc<dyn WorkflowListener>) -> ListenerToken {
        self.inner.registry.register(listener)
    }

    pub fn unregister(&self, listener: &Arc<dyn WorkflowListener>) -> bool {
        self.inner.registry.unregister(listener)
    }

    pub fn unregister_token(&self, token: ListenerToken) -> bool {
        self.inner.registry.unregister_token(token)
    }

    /// Number of live registered listeners.
    pub fn listener_count(&self) -> usize {
        self.inner.registry.len()
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────────

    /// `true` while the transport is active and commands are accepted.
    pub fn is_active(&self) -> bool {
        self.inner.transport.is_active()
    }

    /// Starts the transport.  Wait for [`Notification::Started`] before
    /// sending commands.
    pub async fn start(&self) {
        if self.is_active() {
            info!("workflow controller already started");
            return;
        }

        let events: Arc<dyn SessionEvents> = Arc::new(SessionSink {
            inner: Arc::downgrade(&self.inner),
        });
        if let Err(e) = self.inner.transport.start(events).await {
            error!(error = %e, "failed to start engine transport");
            self.inner
                .notify(Notification::WrapperError(WrapperError::new(START_TAG, e.to_string())));
        }
    }

    /// Stops the transport.
    pub async fn stop(&self) {
        if !self.is_active() {
            info!("workflow controller not started");
            return;
        }

        if let Err(e) = self.inner.transport.stop().await {
            error!(error = %e, "failed to stop engine transport");
            self.inner
                .notify(Notification::WrapperError(WrapperError::new(STOP_TAG, e.to_string())));
        }
    }

    // ── Commands ──────────────────────────────────────────────────────────────

    fn send(&self, command: Command) {
        let tag = command.tag();
        if !self.is_active() {
            debug!(cmd = tag, "command rejected, transport not active");
            self.inner
                .notify(Notification::WrapperError(WrapperError::new(tag, NOT_STARTED)));
            return;
        }

        let payload = match encode_command(&command) {
            Ok(payload) => payload,
            Err(e) => {
                error!(cmd = tag, error = %e, "failed to encode command");
                self.inner
                    .notify(Notification::WrapperError(WrapperError::new(tag, e.to_string())));
                return;
            }
        };

        // Only the tag is logged; SET_PIN and friends carry secrets.
        debug!(cmd = tag, "queueing command");
        if self.inner.outbox.send(Outgoing { tag, payload }).is_err() {
            error!(cmd = tag, "command writer task is gone");
        }
    }

    /// Accepts the requested access rights together with the provider certificate.
    pub fn accept(&self) {
        self.send(Command::Accept);
    }

    /// Cancels the running workflow.
    pub fn cancel(&self) {
        self.send(Command::Cancel);
    }

    /// Resumes a workflow after [`Notification::Pause`].
    pub fn continue_workflow(&self) {
        self.send(Command::ContinueWorkflow);
    }

    pub fn get_access_rights(&self) {
        self.send(Command::GetAccessRights);
    }

    /// Requests the provider certificate; answered by [`Notification::Certificate`].
    pub fn get_certificate(&self) {
        self.send(Command::GetCertificate);
    }

    /// Requests engine build information; answered by [`Notification::Info`].
    pub fn get_info(&self) {
        self.send(Command::GetInfo);
    }

    pub fn get_reader(&self, name: &str) {
        self.send(Command::GetReader {
            name: name.to_string(),
        });
    }

    pub fn get_reader_list(&self) {
        self.send(Command::GetReaderList);
    }

    pub fn get_status(&self) {
        self.send(Command::GetStatus);
    }

    /// Closes the platform NFC dialog so the user can enter a PIN, CAN or PUK.
    pub fn interrupt(&self) {
        self.send(Command::Interrupt);
    }

    /// Enables exactly `optional_rights` among the optional access rights.
    /// An empty slice disables them all.
    pub fn set_access_rights(&self, optional_rights: &[AccessRight]) {
        self.send(Command::SetAccessRights {
            chat: optional_rights
                .iter()
                .map(|right| right.as_str().to_string())
                .collect(),
        });
    }

    /// Supplies the CAN.  Pass `None` on a keypad reader.
    pub fn set_can(&self, can: Option<&str>) {
        self.send(Command::SetCan {
            value: can.map(str::to_string),
        });
    }

    /// Inserts a virtual card into the reader called `name`.
    pub fn set_card(&self, name: &str, simulator: Option<Simulator>) {
        self.send(Command::SetCard {
            name: name.to_string(),
            simulator,
        });
    }

    /// Supplies the new PIN during a PIN change.  Pass `None` on a keypad reader.
    pub fn set_new_pin(&self, new_pin: Option<&str>) {
        self.send(Command::SetNewPin {
            value: new_pin.map(str::to_string),
        });
    }

    /// Supplies the PIN (6 digits, or 5 for a transport PIN).  Pass `None` on a
    /// keypad reader.
    pub fn set_pin(&self, pin: Option<&str>) {
        self.send(Command::SetPin {
            value: pin.map(str::to_string),
        });
    }

    /// Supplies the PUK.  Pass `None` on a keypad reader.
    pub fn set_puk(&self, puk: Option<&str>) {
        self.send(Command::SetPuk {
            value: puk.map(str::to_string),
        });
    }

    /// Starts an authentication against the service behind `tc_token_url`.
    ///
    /// The minimal happy path is: `AuthenticationStarted`, `AccessRights`
    /// (answer with [`accept`](Self::accept)), `InsertCard`, `EnterPin`
    /// (answer with [`set_pin`](Self::set_pin)), `AuthenticationCompleted`.
    pub fn start_authentication(&self, tc_token_url: &Url, options: AuthenticationOptions) {
        self.send(Command::RunAuth {
            tc_token_url: tc_token_url.as_str().to_string(),
            developer_mode: options.developer_mode,
            messages: options.user_info_messages,
            status: options.status_messages,
        });
    }

    /// Starts a PIN change.
    ///
    /// The minimal happy path is: `ChangePinStarted`, `InsertCard`,
    /// `EnterPin`, `EnterNewPin`, `ChangePinCompleted`.
    pub fn start_change_pin(&self, options: ChangePinOptions) {
        self.send(Command::RunChangePin {
            messages: options.user_info_messages,
            status: options.status_messages,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::notification::ChannelListener;
    use crate::application::transport::{MockTransport, TransportError};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::mpsc::UnboundedReceiver;

    async fn next(rx: &mut UnboundedReceiver<Notification>) -> Notification {
        tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("timed out waiting for notification")
            .expect("channel closed")
    }

    async fn assert_quiet(rx: &mut UnboundedReceiver<Notification>) {
        let res = tokio::time::timeout(Duration::from_millis(50), rx.recv()).await;
        assert!(res.is_err(), "unexpected notification: {:?}", res);
    }

    fn controller(mock: MockTransport) -> WorkflowController {
        WorkflowController::new(Arc::new(mock), Handle::current())
    }

    /// Records sent payloads; `start` captures the session sink so tests can
    /// inject engine traffic.
    #[derive(Default)]
    struct RecordingTransport {
        active: Mutex<bool>,
        sent: Mutex<Vec<String>>,
        events: Mutex<Option<Arc<dyn SessionEvents>>>,
    }

    impl RecordingTransport {
        fn inject(&self, json: &str) {
            let events = self.events.lock().unwrap().clone().expect("started");
            events.on_message(json.as_bytes());
        }
    }

    #[async_trait::async_trait]
    impl Transport for RecordingTransport {
        async fn start(&self, events: Arc<dyn SessionEvents>) -> Result<(), TransportError> {
            *self.active.lock().unwrap() = true;
            events.on_session_ready();
            *self.events.lock().unwrap() = Some(events);
            Ok(())
        }

        async fn stop(&self) -> Result<(), TransportError> {
            *self.active.lock().unwrap() = false;
            *self.events.lock().unwrap() = None;
            Ok(())
        }

        fn is_active(&self) -> bool {
            *self.active.lock().unwrap()
        }

        async fn send(&self, payload: String) -> Result<(), TransportError> {
            self.sent.lock().unwrap().push(payload);
            Ok(())
        }
    }

    // ── Preconditions ─────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_command_while_inactive_sends_nothing_and_reports_tag() {
        // Arrange
        let mut mock = MockTransport::new();
        mock.expect_is_active().return_const(false);
        mock.expect_send().never();
        let controller = controller(mock);
        let (listener, mut rx) = ChannelListener::new();
        controller.register(&listener);

        // Act
        controller.set_pin(Some("123456"));

        // Assert
        assert_eq!(
            next(&mut rx).await,
            Notification::WrapperError(WrapperError::new("SET_PIN", NOT_STARTED))
        );
        assert_quiet(&mut rx).await;
    }

    #[tokio::test]
    async fn test_every_command_while_inactive_reports_its_own_tag() {
        let mut mock = MockTransport::new();
        mock.expect_is_active().return_const(false);
        mock.expect_send().never();
        let controller = controller(mock);
        let (listener, mut rx) = ChannelListener::new();
        controller.register(&listener);
        let url = Url::parse("https://example.org/tcToken").expect("url");

        controller.accept();
        controller.cancel();
        controller.continue_workflow();
        controller.get_access_rights();
        controller.get_certificate();
        controller.get_info();
        controller.get_reader("NFC");
        controller.get_reader_list();
        controller.get_status();
        controller.interrupt();
        controller.set_access_rights(&[AccessRight::GivenNames]);
        controller.set_can(None);
        controller.set_card("Simulator", None);
        controller.set_new_pin(None);
        controller.set_pin(None);
        controller.set_puk(None);
        controller.start_authentication(&url, AuthenticationOptions::default());
        controller.start_change_pin(ChangePinOptions::default());

        let expected = [
            "ACCEPT",
            "CANCEL",
            "CONTINUE",
            "GET_ACCESS_RIGHTS",
            "GET_CERTIFICATE",
            "GET_INFO",
            "GET_READER",
            "GET_READER_LIST",
            "GET_STATUS",
            "INTERRUPT",
            "SET_ACCESS_RIGHTS",
            "SET_CAN",
            "SET_CARD",
            "SET_NEW_PIN",
            "SET_PIN",
            "SET_PUK",
            "RUN_AUTH",
            "RUN_CHANGE_PIN",
        ];
        for tag in expected {
            match next(&mut rx).await {
                Notification::WrapperError(err) => {
                    assert_eq!(err.msg, tag);
                    assert_eq!(err.error, NOT_STARTED);
                }
                other => panic!("expected WrapperError, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_start_when_active_is_noop() {
        let mut mock = MockTransport::new();
        mock.expect_is_active().return_const(true);
        mock.expect_start().never();
        let controller = controller(mock);

        controller.start().await;
    }

    #[tokio::test]
    async fn test_stop_when_inactive_is_noop() {
        let mut mock = MockTransport::new();
        mock.expect_is_active().return_const(false);
        mock.expect_stop().never();
        let controller = controller(mock);

        controller.stop().await;
    }

    #[tokio::test]
    async fn test_start_failure_is_reported_as_wrapper_error() {
        let mut mock = MockTransport::new();
        mock.expect_is_active().return_const(false);
        mock.expect_start()
            .times(1)
            .returning(|_| Err(TransportError::ConnectTimeout(Duration::from_secs(10))));
        let controller = controller(mock);
        let (listener, mut rx) = ChannelListener::new();
        controller.register(&listener);

        controller.start().await;

        match next(&mut rx).await {
            Notification::WrapperError(err) => {
                assert_eq!(err.msg, START_TAG);
                assert!(err.error.contains("timed out"));
            }
            other => panic!("expected WrapperError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_is_active_passes_through() {
        let mut mock = MockTransport::new();
        mock.expect_is_active().times(1).return_const(true);
        let controller = controller(mock);

        assert!(controller.is_active());
    }

    // ── Sending ───────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_active_command_is_serialized_and_sent() {
        let transport = Arc::new(RecordingTransport::default());
        let controller = WorkflowController::new(transport.clone(), Handle::current());
        controller.start().await;

        controller.set_access_rights(&[AccessRight::AgeVerification]);
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(
            *transport.sent.lock().unwrap(),
            vec![r#"{"cmd":"SET_ACCESS_RIGHTS","chat":["AgeVerification"]}"#.to_string()]
        );
    }

    #[tokio::test]
    async fn test_start_authentication_applies_options() {
        let transport = Arc::new(RecordingTransport::default());
        let controller = WorkflowController::new(transport.clone(), Handle::current());
        controller.start().await;
        let url = Url::parse("https://test.governikus-eid.de/AusweisAuskunft/WebServiceRequesterServlet")
            .expect("url");

        controller.start_authentication(
            &url,
            AuthenticationOptions { developer_mode: true, status_messages: false, ..Default::default() },
        );
        tokio::time::sleep(Duration::from_millis(20)).await;

        let sent = transport.sent.lock().unwrap().clone();
        let value: serde_json::Value = serde_json::from_str(&sent[0]).expect("json");
        assert_eq!(value["cmd"], "RUN_AUTH");
        assert_eq!(value["tcTokenURL"], url.as_str());
        assert_eq!(value["developerMode"], true);
        assert_eq!(value["status"], false);
        assert!(value.get("messages").is_none());
    }

    // ── Inbound ───────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_session_ready_is_started_notification() {
        let transport = Arc::new(RecordingTransport::default());
        let controller = WorkflowController::new(transport.clone(), Handle::current());
        let (listener, mut rx) = ChannelListener::new();
        controller.register(&listener);

        controller.start().await;

        assert_eq!(next(&mut rx).await, Notification::Started);
    }

    #[tokio::test]
    async fn test_enter_pin_without_reader_yields_single_wrapper_error() {
        let transport = Arc::new(RecordingTransport::default());
        let controller = WorkflowController::new(transport.clone(), Handle::current());
        controller.start().await;
        let (listener, mut rx) = ChannelListener::new();
        controller.register(&listener);

        transport.inject(r#"{"msg":"ENTER_PIN","error":"wrong"}"#);

        assert_eq!(
            next(&mut rx).await,
            Notification::WrapperError(WrapperError::new("ENTER_PIN", "Missing reader object"))
        );
        assert_quiet(&mut rx).await;
    }

    #[tokio::test]
    async fn test_undecodable_and_unknown_messages_are_dropped() {
        let transport = Arc::new(RecordingTransport::default());
        let controller = WorkflowController::new(transport.clone(), Handle::current());
        controller.start().await;
        let (listener, mut rx) = ChannelListener::new();
        controller.register(&listener);

        transport.inject("not json");
        transport.inject(r#"{"msg":"API_LEVEL","current":2}"#);
        transport.inject(r#"{"msg":"INSERT_CARD"}"#);

        assert_eq!(next(&mut rx).await, Notification::InsertCard { error: None });
        assert_quiet(&mut rx).await;
    }

    #[tokio::test]
    async fn test_every_listener_receives_each_notification_once() {
        let transport = Arc::new(RecordingTransport::default());
        let controller = WorkflowController::new(transport.clone(), Handle::current());
        controller.start().await;
        let (a, mut rx_a) = ChannelListener::new();
        let (b, mut rx_b) = ChannelListener::new();
        controller.register(&a);
        controller.register(&a);
        controller.register(&b);

        transport.inject(r#"{"msg":"BAD_STATE","error":"Wrong state"}"#);

        let expected = Notification::BadState { error: "Wrong state".to_string() };
        assert_eq!(next(&mut rx_a).await, expected);
        assert_eq!(next(&mut rx_b).await, expected);
        assert_quiet(&mut rx_a).await;
        assert_eq!(controller.listener_count(), 2);
    }

    #[tokio::test]
    async fn test_transport_does_not_keep_controller_alive() {
        let transport = Arc::new(RecordingTransport::default());
        let controller = WorkflowController::new(transport.clone(), Handle::current());
        controller.start().await;
        let weak = Arc::downgrade(&controller.inner);

        drop(controller);

        assert!(weak.upgrade().is_none());
        transport.inject(r#"{"msg":"INSERT_CARD"}"#);
    }
}
