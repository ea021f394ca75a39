//! Typed value objects describing the state of an eID workflow.
//!
//! These are what applications receive in notifications.  They carry no
//! identity and are rebuilt from every event; see
//! [`crate::domain::conversions`] for how they are assembled from the wire.
//!
//! Dates are calendar dates without a time zone ([`chrono::NaiveDate`]); the
//! engine only ever sends `YYYY-MM-DD`.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use url::Url;

use crate::domain::access_rights::AccessRight;

// ── Card and reader ───────────────────────────────────────────────────────────

/// The identity card currently on a reader.
///
/// All fields absent means the reader sees a card it cannot identify yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Card {
    pub deactivated: Option<bool>,
    pub inoperative: Option<bool>,
    /// Remaining PIN attempts (3 = untouched, 1 = CAN needed, 0 = PUK needed,
    /// -1 = not known to the engine).
    pub pin_retry_counter: Option<i32>,
}

impl Card {
    /// Returns `true` when the engine reported a card but none of its state.
    pub fn is_unknown(&self) -> bool {
        self.deactivated.is_none() && self.inoperative.is_none() && self.pin_retry_counter.is_none()
    }
}

/// A card reader known to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reader {
    pub name: String,
    /// The reader accepts virtual cards via `SET_CARD`.
    pub insertable: bool,
    pub attached: bool,
    /// PIN entry happens on the reader itself; `set_pin(None)` is expected.
    pub keypad: bool,
    /// `None` when no card is present.
    pub card: Option<Card>,
}

// ── Access rights ─────────────────────────────────────────────────────────────

/// Data fields the service provider requests from the card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRights {
    pub required_rights: Vec<AccessRight>,
    pub optional_rights: Vec<AccessRight>,
    /// Rights that will actually be granted if the user accepts now.
    pub effective_rights: Vec<AccessRight>,
    pub transaction_info: Option<String>,
    pub auxiliary_data: Option<AuxiliaryData>,
}

/// Parameters for on-card verifications (age, validity, community).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuxiliaryData {
    pub age_verification_date: Option<NaiveDate>,
    pub required_age: Option<u32>,
    pub validity_date: Option<NaiveDate>,
    pub community_id: Option<String>,
}

// ── Certificate ───────────────────────────────────────────────────────────────

/// The service provider's certificate as shown to the user before accepting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateDescription {
    pub issuer_name: String,
    pub issuer_url: Option<Url>,
    pub purpose: String,
    pub subject_name: String,
    pub subject_url: Option<Url>,
    pub terms_of_usage: String,
    pub validity: CertificateValidity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CertificateValidity {
    pub effective_date: NaiveDate,
    pub expiration_date: NaiveDate,
}

// ── Results ───────────────────────────────────────────────────────────────────

/// Outcome of a finished authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthResult {
    /// Where the application should send the user next.
    pub url: Option<Url>,
    pub result: Option<AuthResultData>,
}

impl AuthResult {
    /// Returns `true` if the result major code signals an error.
    ///
    /// A result without result data is not an error.
    pub fn has_error(&self) -> bool {
        self.result
            .as_ref()
            .is_some_and(|data| data.major.contains("resultmajor#error"))
    }
}

/// eCard-API result codes, see BSI TR-03112.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthResultData {
    pub major: String,
    pub minor: Option<String>,
    pub language: Option<String>,
    pub description: Option<String>,
    pub message: Option<String>,
    pub reason: Option<String>,
}

impl AuthResultData {
    /// Returns `true` if the minor code says the user cancelled.
    pub fn is_cancellation_by_user(&self) -> bool {
        self.minor
            .as_deref()
            .is_some_and(|minor| minor.contains("cancellationByUser"))
    }
}

/// Outcome of a finished PIN change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangePinResult {
    /// `false` if an error occurred or the change was aborted.
    pub success: bool,
    pub reason: Option<String>,
}

// ── Status and info ───────────────────────────────────────────────────────────

/// The kind of workflow a `STATUS` event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkflowProgressType {
    Authentication,
    ChangePin,
}

impl WorkflowProgressType {
    pub fn as_str(self) -> &'static str {
        match self {
            WorkflowProgressType::Authentication => "AUTH",
            WorkflowProgressType::ChangePin => "CHANGE_PIN",
        }
    }
}

impl FromStr for WorkflowProgressType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AUTH" => Ok(WorkflowProgressType::Authentication),
            "CHANGE_PIN" => Ok(WorkflowProgressType::ChangePin),
            _ => Err(()),
        }
    }
}

/// Progress of the running workflow, all fields optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowProgress {
    /// `None` when no workflow runs or the engine reports an unknown kind.
    pub workflow: Option<WorkflowProgressType>,
    /// Percentage, 0 to 100.
    pub progress: Option<i32>,
    pub state: Option<String>,
}

/// Build information of the engine, from the `INFO` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    pub name: String,
    pub implementation_title: String,
    pub implementation_vendor: String,
    pub implementation_version: String,
    pub specification_title: String,
    pub specification_vendor: String,
    pub specification_version: String,
}

// ── Pause ─────────────────────────────────────────────────────────────────────

/// Why the engine paused a workflow.  Resume with `CONTINUE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cause {
    /// The card moved or sits badly on the NFC antenna.
    BadCardPosition,
}

impl Cause {
    pub fn as_str(self) -> &'static str {
        match self {
            Cause::BadCardPosition => "BadCardPosition",
        }
    }
}

impl FromStr for Cause {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BadCardPosition" => Ok(Cause::BadCardPosition),
            _ => Err(()),
        }
    }
}

// ── Adapter errors ────────────────────────────────────────────────────────────

/// An error raised by the adapter itself, not by the engine.
///
/// `msg` names the command or event tag the error relates to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapperError {
    pub msg: String,
    pub error: String,
}

impl WrapperError {
    pub fn new(msg: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            error: error.into(),
        }
    }
}

impl fmt::Display for WrapperError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.msg, self.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_data(major: &str, minor: Option<&str>) -> AuthResultData {
        AuthResultData {
            major: major.to_string(),
            minor: minor.map(str::to_string),
            language: None,
            description: None,
            message: None,
            reason: None,
        }
    }

    #[test]
    fn test_card_without_state_is_unknown() {
        assert!(Card::default().is_unknown());
    }

    #[test]
    fn test_card_with_any_field_is_known() {
        let card = Card { pin_retry_counter: Some(0), ..Default::default() };

        assert!(!card.is_unknown());
    }

    #[test]
    fn test_auth_result_error_major_has_error() {
        let result = AuthResult {
            url: None,
            result: Some(result_data(
                "http://www.bsi.bund.de/ecard/api/1.1/resultmajor#error",
                Some("http://www.bsi.bund.de/ecard/api/1.1/resultminor/sal#cancellationByUser"),
            )),
        };

        assert!(result.has_error());
        assert!(result.result.as_ref().is_some_and(AuthResultData::is_cancellation_by_user));
    }

    #[test]
    fn test_auth_result_ok_major_has_no_error() {
        let result = AuthResult {
            url: Url::parse("https://example.org/done").ok(),
            result: Some(result_data("http://www.bsi.bund.de/ecard/api/1.1/resultmajor#ok", None)),
        };

        assert!(!result.has_error());
    }

    #[test]
    fn test_auth_result_without_data_has_no_error() {
        let result = AuthResult { url: Url::parse("https://example.org").ok(), result: None };

        assert!(!result.has_error());
    }

    #[test]
    fn test_missing_minor_is_not_cancellation() {
        assert!(!result_data("x#error", None).is_cancellation_by_user());
    }

    #[test]
    fn test_workflow_progress_type_from_wire() {
        assert_eq!("AUTH".parse(), Ok(WorkflowProgressType::Authentication));
        assert_eq!("CHANGE_PIN".parse(), Ok(WorkflowProgressType::ChangePin));
        assert_eq!("AUTHENTICATION".parse::<WorkflowProgressType>(), Err(()));
    }

    #[test]
    fn test_cause_from_wire() {
        assert_eq!("BadCardPosition".parse(), Ok(Cause::BadCardPosition));
        assert_eq!("badcardposition".parse::<Cause>(), Err(()));
    }

    #[test]
    fn test_wrapper_error_display() {
        let err = WrapperError::new("ENTER_PIN", "Missing reader object");

        assert_eq!(err.to_string(), "ENTER_PIN: Missing reader object");
    }
}
