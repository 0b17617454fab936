//! Reverse-lookup names.
//!
//! IPv4 addresses map into `in-addr.arpa.` with the octets reversed
//! (RFC 1035 section 3.5); IPv6 addresses map into `ip6.arpa.` with the
//! nibbles reversed (RFC 3596 section 2.5).

use crate::name::Name;
use std::fmt::Write;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Apex of the IPv4 reverse tree.
pub const IN_ADDR_ARPA: &str = "in-addr.arpa.";

/// Apex of the IPv6 reverse tree.
pub const IP6_ARPA: &str = "ip6.arpa.";

/// The two reverse-lookup namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReverseZone {
    /// `in-addr.arpa.`, holding IPv4 PTR records.
    InAddr,
    /// `ip6.arpa.`, holding IPv6 PTR records.
    Ip6,
}

impl ReverseZone {
    /// Returns the apex name of this namespace.
    pub fn apex(self) -> Name {
        Name::from_fqdn_unchecked(self.suffix())
    }

    /// Returns the apex in presentation form.
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::InAddr => IN_ADDR_ARPA,
            Self::Ip6 => IP6_ARPA,
        }
    }

    /// Classifies a PTR owner name.
    ///
    /// Only names strictly below an apex qualify; the apex itself and names
    /// elsewhere in the tree return `None`.
    pub fn classify(name: &Name) -> Option<Self> {
        [Self::InAddr, Self::Ip6]
            .into_iter()
            .find(|zone| name.is_below(&zone.apex()))
    }
}

/// Returns the `in-addr.arpa.` name for an IPv4 address.
pub fn ipv4_reverse_name(addr: Ipv4Addr) -> Name {
    let [a, b, c, d] = addr.octets();
    Name::from_fqdn_unchecked(format!("{d}.{c}.{b}.{a}.{IN_ADDR_ARPA}"))
}

/// Returns the `ip6.arpa.` name for an IPv6 address.
pub fn ipv6_reverse_name(addr: Ipv6Addr) -> Name {
    let mut text = String::with_capacity(64 + IP6_ARPA.len());
    for octet in addr.octets().iter().rev() {
        // Writing to a String cannot fail.
        let _ = write!(text, "{:x}.{:x}.", octet & 0x0f, octet >> 4);
    }
    text.push_str(IP6_ARPA);
    Name::from_fqdn_unchecked(text)
}

/// Returns the reverse-lookup name for any address.
pub fn reverse_name(addr: IpAddr) -> Name {
    match addr {
        IpAddr::V4(v4) => ipv4_reverse_name(v4),
        IpAddr::V6(v6) => ipv6_reverse_name(v6),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_ipv4_reverse() {
        let name = ipv4_reverse_name(Ipv4Addr::new(10, 0, 0, 1));
        assert_eq!(name.to_string(), "1.0.0.10.in-addr.arpa.");
        assert_eq!(name, Name::from_str("1.0.0.10.IN-ADDR.ARPA.").unwrap());
    }

    #[test]
    fn test_ipv6_reverse() {
        let name = ipv6_reverse_name(Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 0x1));
        assert_eq!(
            name.to_string(),
            "1.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.8.b.d.0.1.0.0.2.ip6.arpa."
        );
        assert_eq!(name.label_count(), 32 + 2 + 1);
        // The derived text must also be a valid parsed name.
        assert_eq!(Name::from_str(name.as_str()).unwrap(), name);
    }

    #[test]
    fn test_reverse_name_dispatch() {
        let v4: IpAddr = "192.0.2.5".parse().unwrap();
        assert_eq!(reverse_name(v4).to_string(), "5.2.0.192.in-addr.arpa.");
        let v6: IpAddr = "::1".parse().unwrap();
        assert!(reverse_name(v6).to_string().starts_with("1.0.0.0."));
    }

    #[test]
    fn test_classify() {
        let classify = |s: &str| ReverseZone::classify(&Name::from_str(s).unwrap());
        assert_eq!(classify("1.0.0.10.in-addr.arpa."), Some(ReverseZone::InAddr));
        assert_eq!(classify("1.0.0.10.In-Addr.Arpa."), Some(ReverseZone::InAddr));
        assert_eq!(classify("1.0.ip6.arpa."), Some(ReverseZone::Ip6));
        assert_eq!(classify("in-addr.arpa."), None);
        assert_eq!(classify("blahblah."), None);
        assert_eq!(classify("host.zone.tld."), None);
        assert_eq!(classify("1.0.0.10.in-addr.arpa.zone.tld."), None);
    }
}
