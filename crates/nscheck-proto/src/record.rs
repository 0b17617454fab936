//! DNS resource records.
//!
//! A resource record (RR) is the fundamental unit of zone data: an owner
//! name, type, class, TTL and record-specific data.

use crate::class::RecordClass;
use crate::name::Name;
use crate::rdata::{Opaque, RData, A, AAAA, PTR};
use crate::rtype::{RecordType, Type};
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

/// A DNS resource record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceRecord {
    /// Owner name (left-hand side of the zone entry).
    name: Name,
    /// The record type.
    rtype: Type,
    /// The record class.
    rclass: RecordClass,
    /// Time to live in seconds.
    ttl: u32,
    /// The record data.
    rdata: RData,
}

impl ResourceRecord {
    /// Creates a new resource record.
    pub fn new(name: Name, rtype: Type, rclass: RecordClass, ttl: u32, rdata: RData) -> Self {
        Self {
            name,
            rtype,
            rclass,
            ttl,
            rdata,
        }
    }

    /// Creates an A record.
    pub fn a(name: Name, ttl: u32, addr: Ipv4Addr) -> Self {
        Self::new(
            name,
            Type::Known(RecordType::A),
            RecordClass::IN,
            ttl,
            RData::A(A::new(addr)),
        )
    }

    /// Creates an AAAA record.
    pub fn aaaa(name: Name, ttl: u32, addr: Ipv6Addr) -> Self {
        Self::new(
            name,
            Type::Known(RecordType::AAAA),
            RecordClass::IN,
            ttl,
            RData::AAAA(AAAA::new(addr)),
        )
    }

    /// Creates a PTR record.
    pub fn ptr(name: Name, ttl: u32, target: Name) -> Self {
        Self::new(
            name,
            Type::Known(RecordType::PTR),
            RecordClass::IN,
            ttl,
            RData::PTR(PTR::new(target)),
        )
    }

    /// Creates a record whose data is kept as opaque text.
    pub fn opaque(name: Name, rtype: Type, ttl: u32, text: impl Into<String>) -> Self {
        Self::new(
            name,
            rtype,
            RecordClass::IN,
            ttl,
            RData::Other(Opaque::new(text)),
        )
    }

    /// Returns the owner name.
    #[inline]
    pub fn name(&self) -> &Name {
        &self.name
    }

    /// Returns the record type.
    #[inline]
    pub fn rtype(&self) -> Type {
        self.rtype
    }

    /// Returns the record type if known.
    #[inline]
    pub fn record_type(&self) -> Option<RecordType> {
        self.rtype.as_known()
    }

    /// Returns the record class.
    #[inline]
    pub fn rclass(&self) -> RecordClass {
        self.rclass
    }

    /// Returns the TTL in seconds.
    #[inline]
    pub const fn ttl(&self) -> u32 {
        self.ttl
    }

    /// Returns the record data.
    #[inline]
    pub fn rdata(&self) -> &RData {
        &self.rdata
    }

    /// Returns the record data mutably.
    #[inline]
    pub fn rdata_mut(&mut self) -> &mut RData {
        &mut self.rdata
    }

    /// Replaces the owner name.
    pub fn set_name(&mut self, name: Name) {
        self.name = name;
    }
}

impl fmt::Display for ResourceRecord {
    /// Formats the record as a zone file line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}",
            self.name, self.ttl, self.rclass, self.rtype, self.rdata
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_constructors() {
        let name = Name::from_str("host.zone.tld.").unwrap();
        let a = ResourceRecord::a(name.clone(), 300, Ipv4Addr::new(10, 0, 0, 1));
        assert_eq!(a.record_type(), Some(RecordType::A));
        assert_eq!(a.rclass(), RecordClass::IN);
        assert_eq!(a.ttl(), 300);
        assert_eq!(a.name(), &name);

        let ptr = ResourceRecord::ptr(
            Name::from_str("1.0.0.10.in-addr.arpa.").unwrap(),
            300,
            name.clone(),
        );
        assert_eq!(ptr.rdata().ptr_target(), Some(&name));
    }

    #[test]
    fn test_display_as_zone_line() {
        let a = ResourceRecord::a(
            Name::from_str("host.zone.tld.").unwrap(),
            3600,
            Ipv4Addr::new(10, 0, 0, 1),
        );
        assert_eq!(a.to_string(), "host.zone.tld.\t3600\tIN\tA\t10.0.0.1");

        let unknown = ResourceRecord::opaque(
            Name::from_str("x.zone.tld.").unwrap(),
            Type::Unknown(65280),
            60,
            "\\# 2 abcd",
        );
        assert_eq!(
            unknown.to_string(),
            "x.zone.tld.\t60\tIN\tTYPE65280\t\\# 2 abcd"
        );
    }

    #[test]
    fn test_rdata_mut_spoils_address() {
        let mut a = ResourceRecord::a(
            Name::from_str("host.zone.tld.").unwrap(),
            3600,
            Ipv4Addr::new(10, 0, 0, 1),
        );
        *a.rdata_mut() = RData::A(A::from_octets(b"a"));
        assert!(a.rdata().reverse_name().is_err());
    }
}
