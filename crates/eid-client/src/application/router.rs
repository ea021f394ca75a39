//! Event routing: one decoded engine event in, at most one notification out.
//!
//! [`route`] is a pure function of the event tag and of which companion
//! fields are present.  A tag whose mandatory companion is missing or
//! malformed produces a [`Notification::WrapperError`] naming the tag instead
//! of its regular notification.  A tag the router does not know produces
//! nothing.
//!
//! | Tag                                  | Result                                       |
//! |--------------------------------------|----------------------------------------------|
//! | `AUTH`                               | start failed / completed / started           |
//! | `ACCESS_RIGHTS`                      | access rights (possibly absent)              |
//! | `BAD_STATE`                          | bad state                                    |
//! | `CHANGE_PIN`                         | completed if `success` present, else started |
//! | `ENTER_PIN` / `_NEW_PIN` / `_PUK` / `_CAN` | request, or error without a reader     |
//! | `INSERT_CARD`                        | insert card                                  |
//! | `CERTIFICATE`                        | certificate, or error if incomplete          |
//! | `READER` / `READER_LIST`             | reader(s), possibly absent                   |
//! | `INVALID` / `UNKNOWN_COMMAND`        | wrapper error                                |
//! | `INTERNAL_ERROR`                     | internal error                               |
//! | `STATUS`                             | status                                       |
//! | `INFO`                               | info, or error if incomplete                 |
//! | `PAUSE`                              | pause, or error for a missing/unknown cause  |

use eid_core::{ChangePinResult, Event, EventKind, Reader, WrapperError};

use crate::application::notification::Notification;

pub const MISSING_READER: &str = "Missing reader object";
pub const INVALID_CERTIFICATE: &str = "Missing or invalid certificateDescription";
pub const MISSING_VERSION_INFO: &str = "Missing VersionInfo in message";
pub const MISSING_CAUSE: &str = "Missing cause object";
pub const UNKNOWN_BAD_STATE: &str = "Unknown bad state";
pub const UNKNOWN_INTERNAL_ERROR: &str = "Unknown internal error";
pub const UNKNOWN_WRAPPER_ERROR: &str = "Unknown eID workflow error";

fn wrapper_error(event: &Event, error: impl Into<String>) -> Notification {
    Notification::WrapperError(WrapperError::new(event.msg.clone(), error))
}

fn reader_request(
    event: &Event,
    build: impl FnOnce(Option<String>, Reader) -> Notification,
) -> Notification {
    match event.reader() {
        Some(reader) => build(event.error.clone(), reader),
        None => wrapper_error(event, MISSING_READER),
    }
}

/// Maps `event` to its notification, or `None` for an unrouted tag.
pub fn route(event: &Event) -> Option<Notification> {
    let kind = event.kind()?;

    let notification = match kind {
        EventKind::Auth => {
            if let Some(error) = &event.error {
                Notification::AuthenticationStartFailed { error: error.clone() }
            } else if let Some(result) = event.auth_result() {
                Notification::AuthenticationCompleted(result)
            } else {
                Notification::AuthenticationStarted
            }
        }

        EventKind::AccessRights => Notification::AccessRights {
            error: event.error.clone(),
            access_rights: event.access_rights(),
        },

        EventKind::BadState => Notification::BadState {
            error: event.error.clone().unwrap_or_else(|| UNKNOWN_BAD_STATE.to_string()),
        },

        EventKind::ChangePin => match event.success {
            Some(success) => Notification::ChangePinCompleted(ChangePinResult {
                success,
                reason: event.reason.clone(),
            }),
            None => Notification::ChangePinStarted,
        },

        EventKind::EnterPin => {
            reader_request(event, |error, reader| Notification::EnterPin { error, reader })
        }
        EventKind::EnterNewPin => {
            reader_request(event, |error, reader| Notification::EnterNewPin { error, reader })
        }
        EventKind::EnterPuk => {
            reader_request(event, |error, reader| Notification::EnterPuk { error, reader })
        }
        EventKind::EnterCan => {
            reader_request(event, |error, reader| Notification::EnterCan { error, reader })
        }

        EventKind::InsertCard => Notification::InsertCard {
            error: event.error.clone(),
        },

        EventKind::Certificate => match event.certificate_description() {
            Some(description) => Notification::Certificate(description),
            None => wrapper_error(event, INVALID_CERTIFICATE),
        },

        EventKind::Reader => Notification::Reader(event.reader()),

        EventKind::ReaderList => Notification::ReaderList(event.readers()),

        EventKind::Invalid | EventKind::UnknownCommand => wrapper_error(
            event,
            event.error.clone().unwrap_or_else(|| UNKNOWN_WRAPPER_ERROR.to_string()),
        ),

        EventKind::InternalError => Notification::InternalError {
            error: event
                .error
                .clone()
                .unwrap_or_else(|| UNKNOWN_INTERNAL_ERROR.to_string()),
        },

        EventKind::Status => Notification::Status(event.workflow_progress()),

        EventKind::Info => match event.version_info() {
            Some(info) => Notification::Info(info),
            None => wrapper_error(event, MISSING_VERSION_INFO),
        },

        EventKind::Pause => match event.pause_cause() {
            Some(Ok(cause)) => Notification::Pause(cause),
            Some(Err(raw)) => {
                wrapper_error(event, format!("Failed to map cause \"{raw}\" to Cause"))
            }
            None => wrapper_error(event, MISSING_CAUSE),
        },
    };

    Some(notification)
}
