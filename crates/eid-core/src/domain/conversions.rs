//! Conversions from decoded wire records to workflow value objects.
//!
//! Every conversion here is pure and lenient: a missing or malformed source
//! field yields `None` for the derived value, never a half-filled object and
//! never a panic.  The router decides whether a `None` is a protocol violation
//! for the event at hand.
//!
//! # Rules worth knowing
//!
//! - A reader can arrive nested (`"reader": {…}`) or flattened onto the event
//!   (`"name"`, `"insertable"`, `"attached"`, `"keypad"`, `"card"`).  Both
//!   shapes produce the same [`Reader`].
//! - Certificate dates that fail to parse make the whole certificate absent;
//!   auxiliary dates that fail to parse make only that date absent.
//! - URLs that fail to parse become `None` without discarding their parent.

use chrono::NaiveDate;
use tracing::debug;
use url::Url;

use crate::domain::access_rights::AccessRight;
use crate::domain::workflow::{
    AccessRights, AuthResult, AuthResultData, AuxiliaryData, Card, Cause, CertificateDescription,
    CertificateValidity, Reader, VersionInfo, WorkflowProgress,
};
use crate::protocol::events::{Event, RawAux, RawCard, RawReader, RawVersionInfo};

/// Date pattern used by the engine for every date field.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses an engine date, `None` if it does not match [`DATE_FORMAT`].
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    match NaiveDate::parse_from_str(value, DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(e) => {
            debug!(value, error = %e, "ignoring malformed date");
            None
        }
    }
}

fn parse_url(value: &str) -> Option<Url> {
    match Url::parse(value) {
        Ok(url) => Some(url),
        Err(e) => {
            debug!(value, error = %e, "ignoring malformed URL");
            None
        }
    }
}

fn parse_rights(names: &[String]) -> Vec<AccessRight> {
    names
        .iter()
        .filter_map(|name| match name.parse::<AccessRight>() {
            Ok(right) => Some(right),
            Err(_) => {
                debug!(right = %name, "dropping unknown access right");
                None
            }
        })
        .collect()
}

// ── Raw record conversions ────────────────────────────────────────────────────

impl From<&RawCard> for Card {
    fn from(raw: &RawCard) -> Self {
        Card {
            deactivated: raw.deactivated,
            inoperative: raw.inoperative,
            pin_retry_counter: raw.retry_counter,
        }
    }
}

impl RawReader {
    /// Builds a [`Reader`] if all four scalar fields are present.
    pub fn to_reader(&self) -> Option<Reader> {
        Some(Reader {
            name: self.name.clone()?,
            insertable: self.insertable?,
            attached: self.attached?,
            keypad: self.keypad?,
            card: self.card.as_ref().map(Card::from),
        })
    }
}

impl From<&RawAux> for AuxiliaryData {
    fn from(raw: &RawAux) -> Self {
        AuxiliaryData {
            age_verification_date: raw.age_verification_date.as_deref().and_then(parse_date),
            required_age: raw.required_age.as_deref().and_then(|age| age.parse().ok()),
            validity_date: raw.validity_date.as_deref().and_then(parse_date),
            community_id: raw.community_id.clone(),
        }
    }
}

impl RawVersionInfo {
    /// Builds a [`VersionInfo`] if every key is present.
    pub fn to_version_info(&self) -> Option<VersionInfo> {
        Some(VersionInfo {
            name: self.name.clone()?,
            implementation_title: self.implementation_title.clone()?,
            implementation_vendor: self.implementation_vendor.clone()?,
            implementation_version: self.implementation_version.clone()?,
            specification_title: self.specification_title.clone()?,
            specification_vendor: self.specification_vendor.clone()?,
            specification_version: self.specification_version.clone()?,
        })
    }
}

// ── Event accessors ───────────────────────────────────────────────────────────

impl Event {
    /// The reader this event refers to, from the nested or flattened shape.
    ///
    /// A nested reader object takes precedence; if it is present but
    /// incomplete the reader is not derivable.
    pub fn reader(&self) -> Option<Reader> {
        if let Some(reader) = &self.reader {
            return reader.to_reader();
        }

        Some(Reader {
            name: self.name.clone()?,
            insertable: self.insertable?,
            attached: self.attached?,
            keypad: self.keypad?,
            card: self.card(),
        })
    }

    /// The card at top level, falling back to the nested reader's card.
    pub fn card(&self) -> Option<Card> {
        self.card
            .as_ref()
            .or_else(|| self.reader.as_ref().and_then(|reader| reader.card.as_ref()))
            .map(Card::from)
    }

    /// All readers of a `READER_LIST` event; incomplete entries are skipped.
    pub fn readers(&self) -> Option<Vec<Reader>> {
        self.readers
            .as_ref()
            .map(|readers| readers.iter().filter_map(RawReader::to_reader).collect())
    }

    /// Requested access rights; `None` unless `chat` has all three lists.
    pub fn access_rights(&self) -> Option<AccessRights> {
        let chat = self.chat.as_ref()?;
        let required = chat.required.as_deref()?;
        let optional = chat.optional.as_deref()?;
        let effective = chat.effective.as_deref()?;

        Some(AccessRights {
            required_rights: parse_rights(required),
            optional_rights: parse_rights(optional),
            effective_rights: parse_rights(effective),
            transaction_info: self.transaction_info.clone(),
            auxiliary_data: self.aux.as_ref().map(AuxiliaryData::from),
        })
    }

    /// Result codes of a finished authentication; `None` without `result.major`.
    pub fn auth_result_data(&self) -> Option<AuthResultData> {
        let result = self.result.as_ref()?;

        Some(AuthResultData {
            major: result.major.clone()?,
            minor: result.minor.clone(),
            language: result.language.clone(),
            description: result.description.clone(),
            message: result.message.clone(),
            reason: result.reason.clone(),
        })
    }

    /// Outcome of a finished authentication, if result data or a URL is present.
    pub fn auth_result(&self) -> Option<AuthResult> {
        let result = self.auth_result_data();
        let url = self.url.as_deref().and_then(parse_url);

        if result.is_none() && url.is_none() {
            return None;
        }
        Some(AuthResult { url, result })
    }

    /// Provider certificate; `None` unless description and both dates parse.
    pub fn certificate_description(&self) -> Option<CertificateDescription> {
        let description = self.description.as_ref()?;
        let validity = self.validity.as_ref()?;
        let effective_date = parse_date(validity.effective_date.as_deref()?)?;
        let expiration_date = parse_date(validity.expiration_date.as_deref()?)?;

        Some(CertificateDescription {
            issuer_name: description.issuer_name.clone()?,
            issuer_url: description.issuer_url.as_deref().and_then(parse_url),
            purpose: description.purpose.clone()?,
            subject_name: description.subject_name.clone()?,
            subject_url: description.subject_url.as_deref().and_then(parse_url),
            terms_of_usage: description.terms_of_usage.clone()?,
            validity: CertificateValidity {
                effective_date,
                expiration_date,
            },
        })
    }

    /// Progress of a `STATUS` event.  An unknown workflow name maps to `None`.
    pub fn workflow_progress(&self) -> WorkflowProgress {
        WorkflowProgress {
            workflow: self.workflow.as_deref().and_then(|name| name.parse().ok()),
            progress: self.progress,
            state: self.state.clone(),
        }
    }

    /// Engine build information, if the `VersionInfo` record is complete.
    pub fn version_info(&self) -> Option<VersionInfo> {
        self.version_info.as_ref()?.to_version_info()
    }

    /// The pause cause: `None` if absent, `Some(Err(raw))` if not a known [`Cause`].
    pub fn pause_cause(&self) -> Option<Result<Cause, &str>> {
        let raw = self.cause.as_deref()?;
        Some(raw.parse::<Cause>().map_err(|()| raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::events::{RawChat, RawDescription, RawResult, RawValidity};

    fn raw_reader(name: &str, card: Option<RawCard>) -> RawReader {
        RawReader {
            name: Some(name.to_string()),
            insertable: Some(false),
            attached: Some(true),
            keypad: Some(false),
            card,
        }
    }

    fn healthy_card() -> RawCard {
        RawCard { deactivated: Some(false), inoperative: Some(false), retry_counter: Some(3) }
    }

    // ── Reader ───────────────────────────────────────────────────────────────

    #[test]
    fn test_nested_and_flattened_reader_are_equal() {
        // Arrange
        let nested = Event {
            reader: Some(raw_reader("NFC", Some(healthy_card()))),
            ..Event::with_tag("ENTER_PIN")
        };
        let flattened = Event {
            name: Some("NFC".to_string()),
            insertable: Some(false),
            attached: Some(true),
            keypad: Some(false),
            card: Some(healthy_card()),
            ..Event::with_tag("READER")
        };

        // Act
        let a = nested.reader();
        let b = flattened.reader();

        // Assert
        assert!(a.is_some());
        assert_eq!(a, b);
    }

    #[test]
    fn test_flattened_reader_missing_keypad_is_not_derivable() {
        let event = Event {
            name: Some("NFC".to_string()),
            insertable: Some(false),
            attached: Some(true),
            ..Event::with_tag("ENTER_PIN")
        };

        assert_eq!(event.reader(), None);
    }

    #[test]
    fn test_incomplete_nested_reader_is_not_derivable() {
        let event = Event {
            reader: Some(RawReader { name: Some("NFC".to_string()), ..Default::default() }),
            name: Some("NFC".to_string()),
            insertable: Some(false),
            attached: Some(true),
            keypad: Some(false),
            ..Event::with_tag("ENTER_PIN")
        };

        assert_eq!(event.reader(), None);
    }

    #[test]
    fn test_card_falls_back_to_nested_reader_card() {
        let event = Event {
            reader: Some(raw_reader("NFC", Some(healthy_card()))),
            ..Event::with_tag("ENTER_PIN")
        };

        let card = event.card().expect("card");

        assert_eq!(card.pin_retry_counter, Some(3));
        assert!(!card.is_unknown());
    }

    #[test]
    fn test_empty_card_object_is_unknown_card() {
        let reader = raw_reader("NFC", Some(RawCard::default())).to_reader().expect("reader");

        assert!(reader.card.expect("card present").is_unknown());
    }

    #[test]
    fn test_reader_list_skips_incomplete_entries() {
        let event = Event {
            readers: Some(vec![
                raw_reader("NFC", None),
                RawReader { name: Some("broken".to_string()), ..Default::default() },
                raw_reader("Simulator", Some(healthy_card())),
            ]),
            ..Event::with_tag("READER_LIST")
        };

        let names: Vec<String> =
            event.readers().expect("list").into_iter().map(|r| r.name).collect();

        assert_eq!(names, vec!["NFC".to_string(), "Simulator".to_string()]);
    }

    #[test]
    fn test_missing_reader_list_is_none() {
        assert_eq!(Event::with_tag("READER_LIST").readers(), None);
    }

    // ── Access rights ────────────────────────────────────────────────────────

    #[test]
    fn test_access_rights_drop_unknown_names() {
        let event = Event {
            chat: Some(RawChat {
                effective: Some(vec!["Address".to_string(), "Telepathy".to_string()]),
                optional: Some(vec![]),
                required: Some(vec!["Address".to_string()]),
            }),
            ..Event::with_tag("ACCESS_RIGHTS")
        };

        let rights = event.access_rights().expect("access rights");

        assert_eq!(rights.effective_rights, vec![AccessRight::Address]);
        assert_eq!(rights.required_rights, vec![AccessRight::Address]);
        assert!(rights.optional_rights.is_empty());
        assert_eq!(rights.auxiliary_data, None);
    }

    #[test]
    fn test_access_rights_need_all_three_lists() {
        let event = Event {
            chat: Some(RawChat { effective: Some(vec![]), optional: None, required: Some(vec![]) }),
            ..Event::with_tag("ACCESS_RIGHTS")
        };

        assert_eq!(event.access_rights(), None);
    }

    #[test]
    fn test_aux_bad_date_only_drops_that_date() {
        let raw = RawAux {
            age_verification_date: Some("20.07.1999".to_string()),
            required_age: Some("18".to_string()),
            validity_date: Some("2017-07-20".to_string()),
            community_id: Some("02760400110000".to_string()),
        };

        let aux = AuxiliaryData::from(&raw);

        assert_eq!(aux.age_verification_date, None);
        assert_eq!(aux.required_age, Some(18));
        assert_eq!(aux.validity_date, NaiveDate::from_ymd_opt(2017, 7, 20));
        assert_eq!(aux.community_id.as_deref(), Some("02760400110000"));
    }

    #[test]
    fn test_aux_non_numeric_age_is_none() {
        let raw = RawAux { required_age: Some("eighteen".to_string()), ..Default::default() };

        assert_eq!(AuxiliaryData::from(&raw).required_age, None);
    }

    // ── Auth result ──────────────────────────────────────────────────────────

    #[test]
    fn test_auth_result_requires_major_or_url() {
        let event = Event {
            result: Some(RawResult { minor: Some("only minor".to_string()), ..Default::default() }),
            ..Event::with_tag("AUTH")
        };

        assert_eq!(event.auth_result_data(), None);
        assert_eq!(event.auth_result(), None);
    }

    #[test]
    fn test_auth_result_with_url_only() {
        let event = Event {
            url: Some("https://test.governikus-eid.de/gov_autent/async?refID=1".to_string()),
            ..Event::with_tag("AUTH")
        };

        let result = event.auth_result().expect("auth result");

        assert!(result.result.is_none());
        let url = result.url.expect("url");
        assert_eq!(url.host_str(), Some("test.governikus-eid.de"));
    }

    #[test]
    fn test_auth_result_with_unparseable_url_keeps_result_data() {
        let event = Event {
            result: Some(RawResult { major: Some("x#ok".to_string()), ..Default::default() }),
            url: Some("not a url".to_string()),
            ..Event::with_tag("AUTH")
        };

        let result = event.auth_result().expect("auth result");

        assert_eq!(result.url, None);
        assert_eq!(result.result.map(|r| r.major), Some("x#ok".to_string()));
    }

    // ── Certificate ──────────────────────────────────────────────────────────

    fn certificate_event(effective: &str) -> Event {
        Event {
            description: Some(RawDescription {
                issuer_name: Some("Governikus Test DVCA".to_string()),
                issuer_url: Some("http://www.governikus.de".to_string()),
                purpose: Some("Test".to_string()),
                subject_name: Some("Governikus GmbH & Co. KG".to_string()),
                subject_url: Some("https://test.governikus-eid.de".to_string()),
                terms_of_usage: Some("Anschrift: …".to_string()),
            }),
            validity: Some(RawValidity {
                effective_date: Some(effective.to_string()),
                expiration_date: Some("2017-08-06".to_string()),
            }),
            ..Event::with_tag("CERTIFICATE")
        }
    }

    #[test]
    fn test_certificate_description_parses_dates() {
        let cert = certificate_event("2017-07-07").certificate_description().expect("certificate");

        assert_eq!(cert.validity.effective_date, NaiveDate::from_ymd_opt(2017, 7, 7).expect("date"));
        assert_eq!(cert.validity.expiration_date, NaiveDate::from_ymd_opt(2017, 8, 6).expect("date"));
        assert_eq!(cert.subject_name, "Governikus GmbH & Co. KG");
    }

    #[test]
    fn test_certificate_with_bad_date_is_absent() {
        assert_eq!(certificate_event("07/07/2017").certificate_description(), None);
    }

    #[test]
    fn test_certificate_without_validity_is_absent() {
        let event = Event { validity: None, ..certificate_event("2017-07-07") };

        assert_eq!(event.certificate_description(), None);
    }

    // ── Status, info, pause ──────────────────────────────────────────────────

    #[test]
    fn test_unknown_workflow_name_maps_to_none() {
        let event = Event {
            workflow: Some("SELF_AUTH".to_string()),
            progress: Some(40),
            state: Some("StateEstablishPacePin".to_string()),
            ..Event::with_tag("STATUS")
        };

        let progress = event.workflow_progress();

        assert_eq!(progress.workflow, None);
        assert_eq!(progress.progress, Some(40));
        assert_eq!(progress.state.as_deref(), Some("StateEstablishPacePin"));
    }

    #[test]
    fn test_incomplete_version_info_is_absent() {
        let event = Event {
            version_info: Some(RawVersionInfo { name: Some("AusweisApp2".to_string()), ..Default::default() }),
            ..Event::with_tag("INFO")
        };

        assert_eq!(event.version_info(), None);
    }

    #[test]
    fn test_pause_cause_variants() {
        let known = Event { cause: Some("BadCardPosition".to_string()), ..Event::with_tag("PAUSE") };
        let unknown = Event { cause: Some("SolarFlare".to_string()), ..Event::with_tag("PAUSE") };

        assert_eq!(known.pause_cause(), Some(Ok(Cause::BadCardPosition)));
        assert_eq!(unknown.pause_cause(), Some(Err("SolarFlare")));
        assert_eq!(Event::with_tag("PAUSE").pause_cause(), None);
    }
}
