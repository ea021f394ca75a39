//! Application layer of the eID client.
//!
//! # What lives here?
//!
//! - **`transport`** – The [`transport::Transport`] port the controller talks
//!   through, and the [`transport::SessionEvents`] callbacks a transport uses
//!   to hand inbound data back.  Implementations live in the infrastructure
//!   layer and are injected at construction time.
//!
//! - **`notification`** – The closed [`notification::Notification`] union (one
//!   variant per routed engine event) and the listener capability.
//!
//! - **`listener_registry`** – The weakly-held, ordered listener set.
//!
//! - **`router`** – The pure mapping from a decoded event to one notification.
//!
//! - **`dispatch`** – The FIFO delivery task that calls listeners.
//!
//! - **`options`** – Parameters for starting a workflow.
//!
//! - **`workflow_controller`** – The public entry point tying the above
//!   together.

pub mod dispatch;
pub mod listener_registry;
pub mod notification;
pub mod options;
pub mod router;
pub mod transport;
pub mod workflow_controller;
