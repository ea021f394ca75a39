//! Infrastructure layer for eid-client.
//!
//! Everything that touches the outside world lives here: the concrete
//! [`Transport`](crate::application::transport::Transport) implementations,
//! the TOML configuration file and tracing setup.
//!
//! # Responsibilities
//!
//! - Connecting to a locally running engine over WebSocket
//! - Providing an in-process engine link for tests and embedding
//! - Translating the engine's payload-less "ready" delivery
//! - Loading `ClientConfig` from disk
//! - Installing the `tracing` subscriber
//!
//! # What does NOT belong here?
//!
//! - Routing engine events to notifications (that is the application layer)
//! - Wire types and value objects (those live in `eid-core`)

pub mod config;
pub mod telemetry;
pub mod transport;

pub use config::{ClientConfig, ConfigError, EngineConfig, WorkflowDefaults};
pub use transport::{EngineHandle, InMemoryTransport, WebSocketTransport};
