//! Inbound event records decoded from the eID engine.
//!
//! The engine sends one JSON object per event.  Which fields accompany the
//! `"msg"` tag depends on the tag and, for some tags, on the outcome: an
//! `AUTH` event may carry nothing (workflow started), an `error` (start
//! failed) or a `result`/`url` pair (workflow finished).
//!
//! Rather than one struct per tag, every event decodes into the single flat
//! [`Event`] record that holds the superset of all fields, each one optional.
//! The nested `Raw*` records are equally lenient: a partially filled object
//! still decodes, and it is up to the conversions in
//! [`crate::domain::conversions`] to decide whether enough is present to
//! build a value object.

use serde::{Deserialize, Serialize};

// ── Event tags ────────────────────────────────────────────────────────────────

/// Event tags the workflow controller knows how to route.
///
/// Tags outside this set are still decoded into an [`Event`]; they simply map
/// to no [`EventKind`] and are dropped by the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    AccessRights,
    Auth,
    BadState,
    Certificate,
    ChangePin,
    EnterCan,
    EnterNewPin,
    EnterPin,
    EnterPuk,
    Info,
    InsertCard,
    InternalError,
    Invalid,
    Pause,
    Reader,
    ReaderList,
    Status,
    UnknownCommand,
}

impl EventKind {
    /// Maps a wire tag to its kind, or `None` for tags this crate does not route.
    pub fn parse(tag: &str) -> Option<Self> {
        let kind = match tag {
            "ACCESS_RIGHTS" => EventKind::AccessRights,
            "AUTH" => EventKind::Auth,
            "BAD_STATE" => EventKind::BadState,
            "CERTIFICATE" => EventKind::Certificate,
            "CHANGE_PIN" => EventKind::ChangePin,
            "ENTER_CAN" => EventKind::EnterCan,
            "ENTER_NEW_PIN" => EventKind::EnterNewPin,
            "ENTER_PIN" => EventKind::EnterPin,
            "ENTER_PUK" => EventKind::EnterPuk,
            "INFO" => EventKind::Info,
            "INSERT_CARD" => EventKind::InsertCard,
            "INTERNAL_ERROR" => EventKind::InternalError,
            "INVALID" => EventKind::Invalid,
            "PAUSE" => EventKind::Pause,
            "READER" => EventKind::Reader,
            "READER_LIST" => EventKind::ReaderList,
            "STATUS" => EventKind::Status,
            "UNKNOWN_COMMAND" => EventKind::UnknownCommand,
            _ => return None,
        };
        Some(kind)
    }

    /// Returns the wire tag for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::AccessRights => "ACCESS_RIGHTS",
            EventKind::Auth => "AUTH",
            EventKind::BadState => "BAD_STATE",
            EventKind::Certificate => "CERTIFICATE",
            EventKind::ChangePin => "CHANGE_PIN",
            EventKind::EnterCan => "ENTER_CAN",
            EventKind::EnterNewPin => "ENTER_NEW_PIN",
            EventKind::EnterPin => "ENTER_PIN",
            EventKind::EnterPuk => "ENTER_PUK",
            EventKind::Info => "INFO",
            EventKind::InsertCard => "INSERT_CARD",
            EventKind::InternalError => "INTERNAL_ERROR",
            EventKind::Invalid => "INVALID",
            EventKind::Pause => "PAUSE",
            EventKind::Reader => "READER",
            EventKind::ReaderList => "READER_LIST",
            EventKind::Status => "STATUS",
            EventKind::UnknownCommand => "UNKNOWN_COMMAND",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Nested raw records ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCard {
    pub deactivated: Option<bool>,
    pub inoperative: Option<bool>,
    pub retry_counter: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawReader {
    pub name: Option<String>,
    pub insertable: Option<bool>,
    pub attached: Option<bool>,
    pub keypad: Option<bool>,
    pub card: Option<RawCard>,
}

/// Certificate holder authorization: the access-right wire names grouped by role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawChat {
    pub effective: Option<Vec<String>>,
    pub optional: Option<Vec<String>>,
    pub required: Option<Vec<String>>,
}

/// Auxiliary data; dates are `YYYY-MM-DD`, `requiredAge` is a decimal string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAux {
    pub age_verification_date: Option<String>,
    pub required_age: Option<String>,
    pub validity_date: Option<String>,
    pub community_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawValidity {
    pub effective_date: Option<String>,
    pub expiration_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDescription {
    pub issuer_name: Option<String>,
    pub issuer_url: Option<String>,
    pub purpose: Option<String>,
    pub subject_name: Option<String>,
    pub subject_url: Option<String>,
    pub terms_of_usage: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawResult {
    pub major: Option<String>,
    pub minor: Option<String>,
    pub url: Option<String>,
    pub language: Option<String>,
    pub description: Option<String>,
    pub message: Option<String>,
    pub reason: Option<String>,
}

/// Version record of the `INFO` event, keyed the way the engine writes it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawVersionInfo {
    #[serde(rename = "Name")]
    pub name: Option<String>,
    #[serde(rename = "Implementation-Title")]
    pub implementation_title: Option<String>,
    #[serde(rename = "Implementation-Vendor")]
    pub implementation_vendor: Option<String>,
    #[serde(rename = "Implementation-Version")]
    pub implementation_version: Option<String>,
    #[serde(rename = "Specification-Title")]
    pub specification_title: Option<String>,
    #[serde(rename = "Specification-Vendor")]
    pub specification_vendor: Option<String>,
    #[serde(rename = "Specification-Version")]
    pub specification_version: Option<String>,
}

// ── Event ─────────────────────────────────────────────────────────────────────

/// One decoded engine event: the `msg` tag plus every field any tag may carry.
///
/// Unknown JSON keys are ignored so newer engine versions stay decodable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub msg: String,
    pub error: Option<String>,
    pub card: Option<RawCard>,
    pub result: Option<RawResult>,
    pub chat: Option<RawChat>,
    pub aux: Option<RawAux>,
    pub transaction_info: Option<String>,
    pub validity: Option<RawValidity>,
    pub description: Option<RawDescription>,
    pub url: Option<String>,
    pub success: Option<bool>,
    pub reason: Option<String>,
    pub reader: Option<RawReader>,
    pub readers: Option<Vec<RawReader>>,
    pub name: Option<String>,
    pub insertable: Option<bool>,
    pub attached: Option<bool>,
    pub keypad: Option<bool>,
    pub workflow: Option<String>,
    pub progress: Option<i32>,
    pub state: Option<String>,
    #[serde(rename = "VersionInfo")]
    pub version_info: Option<RawVersionInfo>,
    pub cause: Option<String>,
}

impl Event {
    /// Creates an event carrying only a tag.  Mostly useful in tests.
    pub fn with_tag(msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            ..Default::default()
        }
    }

    /// Returns the routed kind of this event, if the tag is known.
    pub fn kind(&self) -> Option<EventKind> {
        EventKind::parse(&self.msg)
    }
}
