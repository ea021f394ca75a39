//! Outbound command records sent to the eID engine.
//!
//! Every command is a flat JSON object with a `"cmd"` tag plus the fields of
//! its variant.  The tag is fixed per variant: callers pick a variant, they
//! never write the tag themselves.
//!
//! ```text
//! {"cmd":"RUN_AUTH","tcTokenURL":"https://…","developerMode":false,"status":true}
//! {"cmd":"SET_PIN","value":"123456"}
//! {"cmd":"ACCEPT"}
//! ```
//!
//! Optional payload fields are left out of the JSON entirely when they are
//! `None`; the engine treats a missing field and a `null` differently for
//! some commands (e.g. `SET_PIN` without `value` on a keypad reader).

use serde::{Deserialize, Serialize};

// ── Command payload types ─────────────────────────────────────────────────────

/// Texts shown by the platform NFC dialog while a workflow runs.
///
/// Each field is optional; a missing field keeps the engine's built-in text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfoMessages {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_started: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_failed: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_succeeded: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_in_progress: Option<String>,
}

/// Filesystem content for the engine's simulated card reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Simulator {
    pub files: Vec<SimulatorFile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keys: Option<Vec<SimulatorKey>>,
}

/// One elementary file on the simulated card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulatorFile {
    /// File identifier as hex string, e.g. `"0101"`.
    pub file_id: String,
    /// Short file identifier as hex string, e.g. `"01"`.
    pub short_file_id: String,
    /// Hex-encoded file content.
    pub content: String,
}

/// One key on the simulated card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulatorKey {
    pub id: u32,
    /// Hex-encoded key material.
    pub content: String,
}

// ── Command enum ──────────────────────────────────────────────────────────────

/// All commands the engine accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd")]
pub enum Command {
    /// Accept the requested access rights and the provider certificate.
    #[serde(rename = "ACCEPT")]
    Accept,

    #[serde(rename = "CANCEL")]
    Cancel,

    /// Resume a workflow after a `PAUSE` event.
    #[serde(rename = "CONTINUE")]
    ContinueWorkflow,

    #[serde(rename = "GET_CERTIFICATE")]
    GetCertificate,

    /// Start an authentication workflow.
    #[serde(rename = "RUN_AUTH")]
    RunAuth {
        #[serde(rename = "tcTokenURL")]
        tc_token_url: String,
        #[serde(rename = "developerMode")]
        developer_mode: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        messages: Option<UserInfoMessages>,
        status: bool,
    },

    /// Start a PIN change workflow.
    #[serde(rename = "RUN_CHANGE_PIN")]
    RunChangePin {
        #[serde(skip_serializing_if = "Option::is_none")]
        messages: Option<UserInfoMessages>,
        status: bool,
    },

    /// Enable exactly the listed optional access rights (wire names).
    #[serde(rename = "SET_ACCESS_RIGHTS")]
    SetAccessRights { chat: Vec<String> },

    #[serde(rename = "GET_ACCESS_RIGHTS")]
    GetAccessRights,

    #[serde(rename = "SET_CAN")]
    SetCan {
        #[serde(skip_serializing_if = "Option::is_none")]
        value: Option<String>,
    },

    #[serde(rename = "SET_PIN")]
    SetPin {
        #[serde(skip_serializing_if = "Option::is_none")]
        value: Option<String>,
    },

    #[serde(rename = "SET_NEW_PIN")]
    SetNewPin {
        #[serde(skip_serializing_if = "Option::is_none")]
        value: Option<String>,
    },

    #[serde(rename = "SET_PUK")]
    SetPuk {
        #[serde(skip_serializing_if = "Option::is_none")]
        value: Option<String>,
    },

    /// Close the platform NFC dialog so the user can type.
    #[serde(rename = "INTERRUPT")]
    Interrupt,

    #[serde(rename = "GET_STATUS")]
    GetStatus,

    #[serde(rename = "GET_INFO")]
    GetInfo,

    #[serde(rename = "GET_READER")]
    GetReader { name: String },

    #[serde(rename = "GET_READER_LIST")]
    GetReaderList,

    /// Insert a virtual card into the named reader.
    #[serde(rename = "SET_CARD")]
    SetCard {
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        simulator: Option<Simulator>,
    },
}

impl Command {
    /// Returns the wire tag written into the `"cmd"` field.
    pub fn tag(&self) -> &'static str {
        match self {
            Command::Accept => "ACCEPT",
            Command::Cancel => "CANCEL",
            Command::ContinueWorkflow => "CONTINUE",
            Command::GetCertificate => "GET_CERTIFICATE",
            Command::RunAuth { .. } => "RUN_AUTH",
            Command::RunChangePin { .. } => "RUN_CHANGE_PIN",
            Command::SetAccessRights { .. } => "SET_ACCESS_RIGHTS",
            Command::GetAccessRights => "GET_ACCESS_RIGHTS",
            Command::SetCan { .. } => "SET_CAN",
            Command::SetPin { .. } => "SET_PIN",
            Command::SetNewPin { .. } => "SET_NEW_PIN",
            Command::SetPuk { .. } => "SET_PUK",
            Command::Interrupt => "INTERRUPT",
            Command::GetStatus => "GET_STATUS",
            Command::GetInfo => "GET_INFO",
            Command::GetReader { .. } => "GET_READER",
            Command::GetReaderList => "GET_READER_LIST",
            Command::SetCard { .. } => "SET_CARD",
        }
    }

    /// Returns `true` for commands whose payload carries a PIN, CAN or PUK.
    ///
    /// Such payloads must never reach a log line.
    pub fn carries_secret(&self) -> bool {
        matches!(
            self,
            Command::SetCan { .. }
                | Command::SetPin { .. }
                | Command::SetNewPin { .. }
                | Command::SetPuk { .. }
        )
    }
}
