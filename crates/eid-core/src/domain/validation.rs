//! Input checks an application can run before handing values to the engine.
//!
//! The controller forwards whatever it is given; the engine answers malformed
//! input with another `ENTER_*` event.  These helpers let a UI reject obvious
//! typos locally instead of burning a round trip.

use url::Url;

/// Digits in a regular eID PIN.
pub const PIN_LENGTH: usize = 6;
/// Digits in the transport PIN sent with a new card.
pub const TRANSPORT_PIN_LENGTH: usize = 5;
/// Digits in the PIN unblocking key.
pub const PUK_LENGTH: usize = 10;
/// Digits in the card access number printed on the card.
pub const CAN_LENGTH: usize = 6;

/// Returns `true` if `value` is non-empty and consists of ASCII digits only.
pub fn is_numeric(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

fn is_digits_of_len(value: &str, len: usize) -> bool {
    value.len() == len && is_numeric(value)
}

/// A PIN for `SET_PIN`: six digits, or five for a transport PIN.
pub fn is_valid_pin(value: &str) -> bool {
    is_digits_of_len(value, PIN_LENGTH) || is_digits_of_len(value, TRANSPORT_PIN_LENGTH)
}

/// A PIN for `SET_NEW_PIN`: always six digits.
pub fn is_valid_new_pin(value: &str) -> bool {
    is_digits_of_len(value, PIN_LENGTH)
}

pub fn is_valid_puk(value: &str) -> bool {
    is_digits_of_len(value, PUK_LENGTH)
}

pub fn is_valid_can(value: &str) -> bool {
    is_digits_of_len(value, CAN_LENGTH)
}

/// Returns `true` for an absolute `https` URL with a host, as a TC token URL must be.
pub fn is_valid_https_url(url: &Url) -> bool {
    url.scheme() == "https" && url.host_str().is_some_and(|host| !host.is_empty())
}
