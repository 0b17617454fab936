//! # nscheck DNS data model
//!
//! Typed DNS resource records as produced by the zone parser and consumed by
//! the consistency checker:
//!
//! - **Names**: fully-qualified, case-insensitive domain names
//! - **Types and classes**: the record type registry with RFC 3597 fallback
//! - **Record data**: A, AAAA and PTR decoded, everything else kept opaque
//! - **Reverse names**: `in-addr.arpa.` / `ip6.arpa.` derivation for addresses
//!
//! ## Example
//!
//! ```rust
//! use nscheck_proto::{Name, ResourceRecord};
//! use std::net::Ipv4Addr;
//! use std::str::FromStr;
//!
//! let record = ResourceRecord::a(
//!     Name::from_str("host.zone.tld.").unwrap(),
//!     3600,
//!     Ipv4Addr::new(10, 0, 0, 1),
//! );
//! let key = record.rdata().reverse_name().unwrap().unwrap();
//! assert_eq!(key.to_string(), "1.0.0.10.in-addr.arpa.");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod class;
pub mod error;
pub mod name;
pub mod rdata;
pub mod record;
pub mod reverse;
pub mod rtype;

pub use class::RecordClass;
pub use error::{Error, Result};
pub use name::Name;
pub use rdata::RData;
pub use record::ResourceRecord;
pub use reverse::ReverseZone;
pub use rtype::{RecordType, Type};

/// Maximum length of a DNS label (63 bytes per RFC 1035)
pub const MAX_LABEL_LENGTH: usize = 63;

/// Maximum length of a domain name in wire format (255 bytes per RFC 1035)
pub const MAX_NAME_LENGTH: usize = 255;
