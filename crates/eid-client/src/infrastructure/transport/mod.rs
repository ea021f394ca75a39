//! Transport implementations.
//!
//! - [`memory`]: an in-process link.  The engine side is an [`EngineHandle`]
//!   that receives every serialized command and can push raw events back.
//! - [`websocket`]: a WebSocket link to an engine listening on localhost.
//! - [`framing`]: the payload-less "ready" convention shared by both.

pub mod framing;
pub mod memory;
pub mod websocket;

pub use framing::NullReadyFraming;
pub use memory::{EngineHandle, InMemoryTransport};
pub use websocket::WebSocketTransport;
