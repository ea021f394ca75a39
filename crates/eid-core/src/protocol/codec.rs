//! JSON codec for engine commands and events.
//!
//! Wire format: one UTF-8 JSON object per message, no framing bytes.  The
//! transport is responsible for message boundaries (one WebSocket text frame,
//! one callback invocation, …).

use thiserror::Error;

use crate::protocol::commands::Command;
use crate::protocol::events::Event;

/// Errors that can occur while encoding a command or decoding an event.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The payload was empty; the engine never sends empty events.
    #[error("empty payload")]
    EmptyPayload,

    /// The payload is not valid UTF-8.
    #[error("payload is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// The payload is not a JSON object of the expected shape.
    #[error("malformed event: {0}")]
    MalformedEvent(serde_json::Error),

    /// The command could not be serialized.
    #[error("failed to encode command {tag}: {source}")]
    Encode {
        tag: &'static str,
        source: serde_json::Error,
    },
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Serializes a [`Command`] into its JSON text.
///
/// # Errors
///
/// Returns [`ProtocolError::Encode`] if serialization fails.
///
/// # Examples
///
/// ```rust
/// use eid_core::{encode_command, Command};
///
/// let json = encode_command(&Command::Accept).unwrap();
/// assert_eq!(json, r#"{"cmd":"ACCEPT"}"#);
/// ```
pub fn encode_command(command: &Command) -> Result<String, ProtocolError> {
    serde_json::to_string(command).map_err(|source| ProtocolError::Encode {
        tag: command.tag(),
        source,
    })
}

/// Decodes one engine event from raw bytes.
///
/// Surrounding whitespace is tolerated; anything that is not a JSON object
/// with a string `msg` field is rejected.
///
/// # Errors
///
/// Returns [`ProtocolError`] if the bytes are empty, not UTF-8, or not a
/// well-formed event.
///
/// # Examples
///
/// ```rust
/// use eid_core::decode_event;
///
/// let event = decode_event(br#"{"msg":"INSERT_CARD"}"#).unwrap();
/// assert_eq!(event.msg, "INSERT_CARD");
/// assert!(event.error.is_none());
/// ```
pub fn decode_event(bytes: &[u8]) -> Result<Event, ProtocolError> {
    let text = std::str::from_utf8(bytes)?;
    if text.trim().is_empty() {
        return Err(ProtocolError::EmptyPayload);
    }
    serde_json::from_str(text).map_err(ProtocolError::MalformedEvent)
}
