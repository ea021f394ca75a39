//! # eid-core
//!
//! Shared library for the eID workflow adapter containing the JSON wire
//! protocol spoken by the external eID engine, the typed workflow value
//! objects handed to applications, and the conversions between the two.
//!
//! It has zero dependencies on async runtimes, sockets, or threads.
//!
//! # Architecture overview
//!
//! The eID engine (a separately running authentication service that talks to
//! the identity card) is driven by a simple JSON protocol:
//!
//! - The client sends **commands**: flat JSON objects carrying a `"cmd"` tag,
//!   e.g. `{"cmd":"RUN_AUTH","tcTokenURL":"https://…"}`.
//! - The engine replies with **events**: flat JSON objects carrying a `"msg"`
//!   tag plus whichever optional fields that event kind uses, e.g.
//!   `{"msg":"ENTER_PIN","reader":{…}}`.
//!
//! This crate is split the same way:
//!
//! - **`protocol`** – How bytes travel to and from the engine.  Commands are a
//!   closed enum serialized with a fixed tag; events decode into one flat
//!   record whose fields are all optional because the wire format does not
//!   guarantee which ones are present.
//!
//! - **`domain`** – The typed value objects applications see (`Reader`, `Card`,
//!   `AccessRights`, `AuthResult`, …) and the pure conversions that build them
//!   from a decoded event.  Every conversion tolerates missing fields by
//!   producing an absent value, never a half-filled object.  Credential
//!   length rules for application input live here too.

pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `eid_core::Command` instead of `eid_core::protocol::commands::Command`.
pub use domain::access_rights::AccessRight;
pub use domain::workflow::{
    AccessRights, AuthResult, AuthResultData, AuxiliaryData, Card, Cause, CertificateDescription,
    CertificateValidity, ChangePinResult, Reader, VersionInfo, WorkflowProgress,
    WorkflowProgressType, WrapperError,
};
pub use domain::validation::{CAN_LENGTH, PIN_LENGTH, PUK_LENGTH, TRANSPORT_PIN_LENGTH};
pub use protocol::codec::{decode_event, encode_command, ProtocolError};
pub use protocol::commands::{Command, Simulator, SimulatorFile, SimulatorKey, UserInfoMessages};
pub use protocol::events::{Event, EventKind};
