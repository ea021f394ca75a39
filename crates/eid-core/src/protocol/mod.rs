//! Protocol module containing the command and event records and the JSON codec.

pub mod codec;
pub mod commands;
pub mod events;

pub use codec::{decode_event, encode_command, ProtocolError};
pub use commands::*;
pub use events::*;
