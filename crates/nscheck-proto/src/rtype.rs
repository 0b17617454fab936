//! DNS record types.
//!
//! Only the types that realistically appear in authoritative zone files are
//! named here; anything else round-trips as [`Type::Unknown`] using the
//! RFC 3597 `TYPEnnn` notation.

use crate::error::{Error, Result};
use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// DNS record type.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    IntoPrimitive,
    TryFromPrimitive,
    Serialize,
    Deserialize,
)]
#[repr(u16)]
pub enum RecordType {
    /// IPv4 address - RFC 1035
    A = 1,
    /// Authoritative name server - RFC 1035
    NS = 2,
    /// Canonical name (alias) - RFC 1035
    CNAME = 5,
    /// Start of authority - RFC 1035
    SOA = 6,
    /// Domain name pointer - RFC 1035
    PTR = 12,
    /// Host information - RFC 1035
    HINFO = 13,
    /// Mail exchange - RFC 1035
    MX = 15,
    /// Text strings - RFC 1035
    TXT = 16,
    /// Responsible person - RFC 1183
    RP = 17,
    /// AFS database location - RFC 1183
    AFSDB = 18,
    /// IPv6 address - RFC 3596
    AAAA = 28,
    /// Location information - RFC 1876
    LOC = 29,
    /// Service locator - RFC 2782
    SRV = 33,
    /// Naming authority pointer - RFC 3403
    NAPTR = 35,
    /// Delegation name - RFC 6672
    DNAME = 39,
    /// Delegation signer - RFC 4034
    DS = 43,
    /// SSH key fingerprint - RFC 4255
    SSHFP = 44,
    /// DNSSEC signature - RFC 4034
    RRSIG = 46,
    /// Next secure record - RFC 4034
    NSEC = 47,
    /// DNS public key - RFC 4034
    DNSKEY = 48,
    /// Next secure record v3 - RFC 5155
    NSEC3 = 50,
    /// NSEC3 parameters - RFC 5155
    NSEC3PARAM = 51,
    /// TLS certificate association - RFC 6698
    TLSA = 52,
    /// Child DS - RFC 7344
    CDS = 59,
    /// Child DNSKEY - RFC 7344
    CDNSKEY = 60,
    /// Service binding - RFC 9460
    SVCB = 64,
    /// HTTPS service binding - RFC 9460
    HTTPS = 65,
    /// Sender policy framework - RFC 7208
    SPF = 99,
    /// Certification authority authorization - RFC 8659
    CAA = 257,
}

impl RecordType {
    /// Every named type, in numeric order.
    pub const ALL: &'static [RecordType] = &[
        Self::A,
        Self::NS,
        Self::CNAME,
        Self::SOA,
        Self::PTR,
        Self::HINFO,
        Self::MX,
        Self::TXT,
        Self::RP,
        Self::AFSDB,
        Self::AAAA,
        Self::LOC,
        Self::SRV,
        Self::NAPTR,
        Self::DNAME,
        Self::DS,
        Self::SSHFP,
        Self::RRSIG,
        Self::NSEC,
        Self::DNSKEY,
        Self::NSEC3,
        Self::NSEC3PARAM,
        Self::TLSA,
        Self::CDS,
        Self::CDNSKEY,
        Self::SVCB,
        Self::HTTPS,
        Self::SPF,
        Self::CAA,
    ];

    /// Returns the numeric value.
    #[inline]
    pub const fn to_u16(self) -> u16 {
        self as u16
    }

    /// Creates a record type from its numeric value.
    #[inline]
    pub fn from_u16(value: u16) -> Option<Self> {
        Self::try_from(value).ok()
    }

    /// Returns true for the forward address types (A and AAAA).
    #[inline]
    pub const fn is_address(self) -> bool {
        matches!(self, Self::A | Self::AAAA)
    }

    /// Returns the mnemonic used in zone files.
    pub const fn name(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::NS => "NS",
            Self::CNAME => "CNAME",
            Self::SOA => "SOA",
            Self::PTR => "PTR",
            Self::HINFO => "HINFO",
            Self::MX => "MX",
            Self::TXT => "TXT",
            Self::RP => "RP",
            Self::AFSDB => "AFSDB",
            Self::AAAA => "AAAA",
            Self::LOC => "LOC",
            Self::SRV => "SRV",
            Self::NAPTR => "NAPTR",
            Self::DNAME => "DNAME",
            Self::DS => "DS",
            Self::SSHFP => "SSHFP",
            Self::RRSIG => "RRSIG",
            Self::NSEC => "NSEC",
            Self::DNSKEY => "DNSKEY",
            Self::NSEC3 => "NSEC3",
            Self::NSEC3PARAM => "NSEC3PARAM",
            Self::TLSA => "TLSA",
            Self::CDS => "CDS",
            Self::CDNSKEY => "CDNSKEY",
            Self::SVCB => "SVCB",
            Self::HTTPS => "HTTPS",
            Self::SPF => "SPF",
            Self::CAA => "CAA",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RecordType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownType(s.to_string()))
    }
}

/// A type value that can represent both named types and unknown values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Type {
    /// A known, named record type.
    Known(RecordType),
    /// An unknown type value (TYPE#### format per RFC 3597).
    Unknown(u16),
}

impl Type {
    /// Creates a type from a u16 value.
    #[inline]
    pub fn from_u16(value: u16) -> Self {
        RecordType::from_u16(value).map_or(Self::Unknown(value), Self::Known)
    }

    /// Returns the numeric value.
    #[inline]
    pub const fn to_u16(self) -> u16 {
        match self {
            Self::Known(t) => t.to_u16(),
            Self::Unknown(v) => v,
        }
    }

    /// Returns the named type if known.
    #[inline]
    pub const fn as_known(self) -> Option<RecordType> {
        match self {
            Self::Known(t) => Some(t),
            Self::Unknown(_) => None,
        }
    }
}

impl From<RecordType> for Type {
    fn from(t: RecordType) -> Self {
        Self::Known(t)
    }
}

impl From<u16> for Type {
    fn from(value: u16) -> Self {
        Self::from_u16(value)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(t) => write!(f, "{t}"),
            Self::Unknown(v) => write!(f, "TYPE{v}"),
        }
    }
}

impl FromStr for Type {
    type Err = Error;

    /// Accepts mnemonics (`AAAA`) and the generic form (`TYPE28`).
    fn from_str(s: &str) -> Result<Self> {
        if let Ok(t) = RecordType::from_str(s) {
            return Ok(Self::Known(t));
        }
        let upper = s.to_ascii_uppercase();
        upper
            .strip_prefix("TYPE")
            .and_then(|n| n.parse::<u16>().ok())
            .map(Self::from_u16)
            .ok_or_else(|| Error::UnknownType(s.to_string()))
    }
}
