//! DNS record data (RDATA).
//!
//! Only the data the consistency checker inspects is decoded:
//!
//! - **Address records**: A, AAAA, kept as raw octets
//! - **Pointer records**: PTR, decoded to its target name
//! - **Everything else**: preserved as opaque presentation text
//!
//! Address records keep the octets exactly as they were found in the zone
//! (a generic `\# 3 0a0000` RDATA on an A record yields three octets). The
//! length is checked when the address is used, not when it is loaded.

use crate::error::{Error, Result};
use crate::name::Name;
use crate::reverse::{ipv4_reverse_name, ipv6_reverse_name};
use data_encoding::HEXLOWER;
use smallvec::SmallVec;
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

/// Writes octets in RFC 3597 generic form: `\# <len> <hex>`.
fn write_generic(f: &mut fmt::Formatter<'_>, octets: &[u8]) -> fmt::Result {
    if octets.is_empty() {
        write!(f, "\\# 0")
    } else {
        write!(f, "\\# {} {}", octets.len(), HEXLOWER.encode(octets))
    }
}

/// A record - IPv4 address (RFC 1035).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct A {
    octets: SmallVec<[u8; 4]>,
}

impl A {
    /// Creates an A record from a well-formed address.
    pub fn new(address: Ipv4Addr) -> Self {
        Self {
            octets: SmallVec::from_slice(&address.octets()),
        }
    }

    /// Creates an A record from raw octets without checking their length.
    pub fn from_octets(octets: &[u8]) -> Self {
        Self {
            octets: SmallVec::from_slice(octets),
        }
    }

    /// Returns the raw octets.
    pub fn octets(&self) -> &[u8] {
        &self.octets
    }

    /// Returns the IPv4 address, or an error if the octets are not exactly 4.
    pub fn address(&self) -> Result<Ipv4Addr> {
        let octets: [u8; 4] = self
            .octets
            .as_slice()
            .try_into()
            .map_err(|_| Error::AddressLength {
                rtype: "A",
                expected: 4,
                actual: self.octets.len(),
            })?;
        Ok(Ipv4Addr::from(octets))
    }

    /// Returns the `in-addr.arpa.` name for this address.
    pub fn reverse_name(&self) -> Result<Name> {
        self.address().map(ipv4_reverse_name)
    }
}

impl From<Ipv4Addr> for A {
    fn from(address: Ipv4Addr) -> Self {
        Self::new(address)
    }
}

impl fmt::Display for A {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.address() {
            Ok(addr) => write!(f, "{addr}"),
            Err(_) => write_generic(f, &self.octets),
        }
    }
}

/// AAAA record - IPv6 address (RFC 3596).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AAAA {
    octets: SmallVec<[u8; 16]>,
}

impl AAAA {
    /// Creates an AAAA record from a well-formed address.
    pub fn new(address: Ipv6Addr) -> Self {
        Self {
            octets: SmallVec::from_slice(&address.octets()),
        }
    }

    /// Creates an AAAA record from raw octets without checking their length.
    pub fn from_octets(octets: &[u8]) -> Self {
        Self {
            octets: SmallVec::from_slice(octets),
        }
    }

    /// Returns the raw octets.
    pub fn octets(&self) -> &[u8] {
        &self.octets
    }

    /// Returns the IPv6 address, or an error if the octets are not exactly 16.
    pub fn address(&self) -> Result<Ipv6Addr> {
        let octets: [u8; 16] = self
            .octets
            .as_slice()
            .try_into()
            .map_err(|_| Error::AddressLength {
                rtype: "AAAA",
                expected: 16,
                actual: self.octets.len(),
            })?;
        Ok(Ipv6Addr::from(octets))
    }

    /// Returns the `ip6.arpa.` name for this address.
    pub fn reverse_name(&self) -> Result<Name> {
        self.address().map(ipv6_reverse_name)
    }
}

impl From<Ipv6Addr> for AAAA {
    fn from(address: Ipv6Addr) -> Self {
        Self::new(address)
    }
}

impl fmt::Display for AAAA {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.address() {
            Ok(addr) => write!(f, "{addr}"),
            Err(_) => write_generic(f, &self.octets),
        }
    }
}

/// PTR record - domain name pointer (RFC 1035).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PTR {
    target: Name,
}

impl PTR {
    /// Creates a PTR record pointing at `target`.
    pub fn new(target: Name) -> Self {
        Self { target }
    }

    /// Returns the name this pointer refers to.
    pub fn target(&self) -> &Name {
        &self.target
    }
}

impl fmt::Display for PTR {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.target)
    }
}

/// RDATA of a type the checker does not inspect.
///
/// The presentation text is kept verbatim (whitespace-normalized) so the
/// record can still be printed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Opaque {
    text: String,
}

impl Opaque {
    /// Creates opaque data from presentation tokens.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Returns the presentation text.
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// DNS record data.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RData {
    /// IPv4 address (A record)
    A(A),
    /// IPv6 address (AAAA record)
    AAAA(AAAA),
    /// Pointer (PTR record)
    PTR(PTR),
    /// Any other record type
    Other(Opaque),
}

impl RData {
    /// Returns the reverse-lookup name for address data.
    ///
    /// `Ok(None)` for non-address data; an error when the address octets
    /// have the wrong length.
    pub fn reverse_name(&self) -> Result<Option<Name>> {
        match self {
            Self::A(a) => a.reverse_name().map(Some),
            Self::AAAA(aaaa) => aaaa.reverse_name().map(Some),
            Self::PTR(_) | Self::Other(_) => Ok(None),
        }
    }

    /// Returns the PTR target, if this is PTR data.
    pub fn ptr_target(&self) -> Option<&Name> {
        match self {
            Self::PTR(ptr) => Some(ptr.target()),
            _ => None,
        }
    }
}

impl fmt::Display for RData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A(a) => write!(f, "{a}"),
            Self::AAAA(aaaa) => write!(f, "{aaaa}"),
            Self::PTR(ptr) => write!(f, "{ptr}"),
            Self::Other(opaque) => write!(f, "{opaque}"),
        }
    }
}
