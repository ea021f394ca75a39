//! The closed set of data groups and functions a service may request.
//!
//! Wire names are the engine's exact spelling (`"GivenNames"`,
//! `"ResidencePermitII"`, …).  Names outside this set are skipped when an
//! access-rights event is converted, so a newer engine cannot break decoding.

use std::fmt;
use std::str::FromStr;

/// One requestable access right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AccessRight {
    Address,
    BirthName,
    FamilyName,
    GivenNames,
    PlaceOfBirth,
    DateOfBirth,
    DoctoralDegree,
    ArtisticName,
    Pseudonym,
    ValidUntil,
    Nationality,
    IssuingCountry,
    DocumentType,
    ResidencePermitI,
    ResidencePermitII,
    CommunityId,
    AddressVerification,
    AgeVerification,
    WriteAddress,
    WriteCommunityId,
    WriteResidencePermitI,
    WriteResidencePermitII,
    CanAllowed,
    PinManagement,
}

impl AccessRight {
    /// Every right, in the order the engine documents them.
    pub const ALL: [AccessRight; 24] = [
        AccessRight::Address,
        AccessRight::BirthName,
        AccessRight::FamilyName,
        AccessRight::GivenNames,
        AccessRight::PlaceOfBirth,
        AccessRight::DateOfBirth,
        AccessRight::DoctoralDegree,
        AccessRight::ArtisticName,
        AccessRight::Pseudonym,
        AccessRight::ValidUntil,
        AccessRight::Nationality,
        AccessRight::IssuingCountry,
        AccessRight::DocumentType,
        AccessRight::ResidencePermitI,
        AccessRight::ResidencePermitII,
        AccessRight::CommunityId,
        AccessRight::AddressVerification,
        AccessRight::AgeVerification,
        AccessRight::WriteAddress,
        AccessRight::WriteCommunityId,
        AccessRight::WriteResidencePermitI,
        AccessRight::WriteResidencePermitII,
        AccessRight::CanAllowed,
        AccessRight::PinManagement,
    ];

    /// Returns the engine's wire name for this right.
    pub fn as_str(self) -> &'static str {
        match self {
            AccessRight::Address => "Address",
            AccessRight::BirthName => "BirthName",
            AccessRight::FamilyName => "FamilyName",
            AccessRight::GivenNames => "GivenNames",
            AccessRight::PlaceOfBirth => "PlaceOfBirth",
            AccessRight::DateOfBirth => "DateOfBirth",
            AccessRight::DoctoralDegree => "DoctoralDegree",
            AccessRight::ArtisticName => "ArtisticName",
            AccessRight::Pseudonym => "Pseudonym",
            AccessRight::ValidUntil => "ValidUntil",
            AccessRight::Nationality => "Nationality",
            AccessRight::IssuingCountry => "IssuingCountry",
            AccessRight::DocumentType => "DocumentType",
            AccessRight::ResidencePermitI => "ResidencePermitI",
            AccessRight::ResidencePermitII => "ResidencePermitII",
            AccessRight::CommunityId => "CommunityID",
            AccessRight::AddressVerification => "AddressVerification",
            AccessRight::AgeVerification => "AgeVerification",
            AccessRight::WriteAddress => "WriteAddress",
            AccessRight::WriteCommunityId => "WriteCommunityID",
            AccessRight::WriteResidencePermitI => "WriteResidencePermitI",
            AccessRight::WriteResidencePermitII => "WriteResidencePermitII",
            AccessRight::CanAllowed => "CanAllowed",
            AccessRight::PinManagement => "PinManagement",
        }
    }
}

impl FromStr for AccessRight {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AccessRight::ALL
            .into_iter()
            .find(|right| right.as_str() == s)
            .ok_or(())
    }
}

impl fmt::Display for AccessRight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
