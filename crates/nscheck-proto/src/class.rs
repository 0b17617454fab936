//! DNS record classes.
//!
//! Zone files are almost always `IN`; `CH` and `HS` are accepted so that a
//! `version.bind.`-style record does not stop a whole directory from loading.

use crate::error::{Error, Result};
use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// DNS record class (RFC 1035 section 3.2.4).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    IntoPrimitive,
    TryFromPrimitive,
    Serialize,
    Deserialize,
)]
#[repr(u16)]
pub enum RecordClass {
    /// Internet
    #[default]
    IN = 1,
    /// CHAOS
    CH = 3,
    /// Hesiod
    HS = 4,
}

impl RecordClass {
    /// Returns the numeric value of the class.
    #[inline]
    pub const fn to_u16(self) -> u16 {
        self as u16
    }

    /// Returns the mnemonic used in zone files.
    pub const fn name(self) -> &'static str {
        match self {
            Self::IN => "IN",
            Self::CH => "CH",
            Self::HS => "HS",
        }
    }
}

impl fmt::Display for RecordClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RecordClass {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "IN" => Ok(Self::IN),
            "CH" | "CHAOS" => Ok(Self::CH),
            "HS" | "HESIOD" => Ok(Self::HS),
            _ => Err(Error::UnknownClass(s.to_string())),
        }
    }
}
