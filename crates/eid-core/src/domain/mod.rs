//! Workflow value objects and the conversions that build them.
//!
//! # Where the domain starts (for beginners)
//!
//! The `protocol` module mirrors the engine's JSON one-to-one: every field is
//! optional and stringly typed, because that is what the wire guarantees.
//! The domain is the other side of that boundary.  Its types are what an
//! application actually wants to hold: a [`workflow::Reader`] always has a
//! name, a [`workflow::CertificateValidity`] always has two real dates, and
//! an [`access_rights::AccessRight`] is an enum, not a string.
//!
//! Crossing the boundary happens in exactly one place,
//! [`conversions`], and every crossing can fail softly by returning `None`.
//! Nothing in this module performs I/O.

/// The 24 access rights a service provider can request.
pub mod access_rights;

/// Wire record → value object conversions.
pub mod conversions;

/// Credential length rules and URL checks for application input.
pub mod validation;

/// Readers, cards, certificates, results and progress.
pub mod workflow;
