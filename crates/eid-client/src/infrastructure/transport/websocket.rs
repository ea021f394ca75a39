//! WebSocket link to a locally running engine.
//!
//! The engine listens on `ws://127.0.0.1:24727/eID-Kernel` by default.  Every
//! command is sent as one text frame and every text frame received is one raw
//! event.
//!
//! # Lifecycle
//!
//! 1. [`Transport::start`] performs the WebSocket handshake, bounded by the
//!    configured connect timeout.  A finished handshake counts as the engine's
//!    payload-less ready delivery and is passed through [`NullReadyFraming`].
//! 2. A reader task forwards text frames until the engine closes the
//!    connection, the link fails, or `stop` is called.  After that the
//!    session is inactive.
//! 3. Outbound sends share one writer behind an async mutex, so frames are
//!    never interleaved.
//!
//! # What is a split WebSocket? (for beginners)
//!
//! `ws_stream.split()` turns one bidirectional connection into a read half
//! (a `Stream` of frames) and a write half (a `Sink` of frames).  The read half
//! moves into the reader task; the write half stays here so `send` can use it
//! while the reader is blocked waiting for the next frame.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{Error as WsError, Message as WsMessage},
    MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, info, warn};
use url::Url;

use crate::application::transport::{SessionEvents, Transport, TransportError};
use crate::infrastructure::config::EngineConfig;
use crate::infrastructure::transport::framing::NullReadyFraming;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsWriter = SplitSink<WsStream, WsMessage>;
type WsReader = SplitStream<WsStream>;

/// State of one connection.  A fresh session is created on every start so a
/// lingering reader from an earlier connection cannot touch the current one.
#[derive(Default)]
struct Session {
    active: AtomicBool,
    framing: NullReadyFraming,
}

/// A [`Transport`] that talks to the engine over WebSocket.
pub struct WebSocketTransport {
    config: EngineConfig,
    session: Mutex<Option<Arc<Session>>>,
    writer: tokio::sync::Mutex<Option<WsWriter>>,
    reader: Mutex<Option<JoinHandle<()>>>,
}

impl WebSocketTransport {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            session: Mutex::new(None),
            writer: tokio::sync::Mutex::new(None),
            reader: Mutex::new(None),
        }
    }

    fn current_session(&self) -> Option<Arc<Session>> {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn connect(&self) -> Result<WsStream, TransportError> {
        let url = Url::parse(&self.config.url).map_err(|e| TransportError::ConnectFailed {
            url: self.config.url.clone(),
            reason: e.to_string(),
        })?;
        let limit = self.config.connect_timeout();

        match timeout(limit, connect_async(url.as_str())).await {
            Ok(Ok((stream, _response))) => Ok(stream),
            Ok(Err(e)) => Err(TransportError::ConnectFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }),
            Err(_) => Err(TransportError::ConnectTimeout(limit)),
        }
    }
}

#[async_trait]
impl Transport for WebSocketTransport {
    async fn start(&self, events: Arc<dyn SessionEvents>) -> Result<(), TransportError> {
        let stream = self.connect().await?;
        info!(url = %self.config.url, "connected to engine");

        let (writer, reader) = stream.split();
        *self.writer.lock().await = Some(writer);

        let session = Arc::new(Session::default());
        session.active.store(true, Ordering::SeqCst);
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&session));

        session.framing.deliver(None, events.as_ref());

        let task = tokio::spawn(read_frames(reader, events, session));
        if let Some(previous) = self
            .reader
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(task)
        {
            previous.abort();
        }
        Ok(())
    }

    async fn stop(&self) -> Result<(), TransportError> {
        if let Some(session) = self
            .session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            session.active.store(false, Ordering::SeqCst);
        }
        if let Some(task) = self
            .reader
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            task.abort();
        }

        if let Some(mut writer) = self.writer.lock().await.take() {
            if let Err(e) = writer.close().await {
                debug!(error = %e, "engine link already closed");
            }
        }
        info!("disconnected from engine");
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.current_session()
            .is_some_and(|session| session.active.load(Ordering::SeqCst))
    }

    async fn send(&self, payload: String) -> Result<(), TransportError> {
        if !self.is_active() {
            return Err(TransportError::NotActive);
        }

        let mut guard = self.writer.lock().await;
        let writer = guard.as_mut().ok_or(TransportError::NotActive)?;
        writer
            .send(WsMessage::Text(payload))
            .await
            .map_err(|e| match e {
                WsError::ConnectionClosed | WsError::AlreadyClosed => TransportError::Closed,
                other => TransportError::Link(other.to_string()),
            })
    }
}

/// Forwards text frames to `events` until the link ends, then marks the
/// session inactive.
async fn read_frames(mut reader: WsReader, events: Arc<dyn SessionEvents>, session: Arc<Session>) {
    loop {
        let frame = match reader.next().await {
            Some(Ok(frame)) => frame,
            Some(Err(WsError::ConnectionClosed | WsError::Protocol(_))) => {
                debug!("engine WebSocket closed");
                break;
            }
            Some(Err(e)) => {
                warn!(error = %e, "engine WebSocket error");
                break;
            }
            None => {
                debug!("engine stream ended");
                break;
            }
        };

        match frame {
            WsMessage::Text(text) => {
                session.framing.deliver(Some(text.as_bytes()), events.as_ref());
            }
            WsMessage::Binary(data) => {
                warn!(len = data.len(), "unexpected binary frame from engine (ignored)");
            }
            WsMessage::Ping(data) => {
                debug!(len = data.len(), "WebSocket ping");
            }
            WsMessage::Pong(_) => {
                debug!("WebSocket pong received");
            }
            WsMessage::Close(_) => {
                debug!("engine sent Close frame");
                break;
            }
            WsMessage::Frame(_) => {
                debug!("raw frame (ignored)");
            }
        }
    }

    session.active.store(false, Ordering::SeqCst);
    info!("engine link closed");
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Silent;

    impl SessionEvents for Silent {
        fn on_session_ready(&self) {}
        fn on_message(&self, _payload: &[u8]) {}
    }

    #[tokio::test]
    async fn test_new_transport_is_inactive() {
        let transport = WebSocketTransport::new(EngineConfig::default());

        assert!(!transport.is_active());
    }

    #[tokio::test]
    async fn test_send_before_start_is_not_active() {
        let transport = WebSocketTransport::new(EngineConfig::default());

        let result = transport.send(r#"{"cmd":"GET_INFO"}"#.to_string()).await;

        assert!(matches!(result, Err(TransportError::NotActive)));
    }

    #[tokio::test]
    async fn test_start_with_invalid_url_fails() {
        let config = EngineConfig {
            url: "not a url".to_string(),
            ..EngineConfig::default()
        };
        let transport = WebSocketTransport::new(config);

        let result = transport.start(Arc::new(Silent)).await;

        match result {
            Err(TransportError::ConnectFailed { url, .. }) => assert_eq!(url, "not a url"),
            other => panic!("expected ConnectFailed, got {:?}", other),
        }
        assert!(!transport.is_active());
    }

    #[tokio::test]
    async fn test_stop_without_start_is_ok() {
        let transport = WebSocketTransport::new(EngineConfig::default());

        assert!(transport.stop().await.is_ok());
    }
}
