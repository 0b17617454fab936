//! # nscheck consistency checks
//!
//! Cross-checks forward (A/AAAA) and reverse (PTR) records held in a
//! [`RecordStore`](nscheck_zone::RecordStore):
//!
//! - every A/AAAA owner must have at least one address whose reverse name
//!   owns a PTR record,
//! - every PTR owner must point at some name whose A/AAAA addresses map
//!   back to that owner.
//!
//! ## Example
//!
//! ```rust
//! use std::net::Ipv4Addr;
//! use std::str::FromStr;
//! use nscheck_check::ConsistencyChecker;
//! use nscheck_proto::{Name, ResourceRecord};
//! use nscheck_zone::RecordStore;
//!
//! let host = Name::from_str("host.zone.tld.").unwrap();
//! let mut store = RecordStore::new();
//! store.add(ResourceRecord::a(host.clone(), 3600, Ipv4Addr::new(10, 0, 0, 1)));
//! store.add(ResourceRecord::ptr(
//!     Name::from_str("1.0.0.10.in-addr.arpa.").unwrap(),
//!     3600,
//!     host,
//! ));
//!
//! let mut checker = ConsistencyChecker::new(store);
//! assert!(checker.check_a().unwrap().is_empty());
//! assert!(checker.check_ptr().unwrap().is_empty());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod checker;
pub mod handle;
pub mod index;
pub mod report;

use nscheck_proto::{Name, RecordType};
use thiserror::Error;

pub use checker::ConsistencyChecker;
pub use handle::CheckerHandle;
pub use index::{Index, IndexState};
pub use report::{format_failed, CheckKind, CheckReport};

/// Errors raised while building the reverse-lookup indexes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckError {
    /// An address record whose data cannot be turned into a reverse name.
    #[error("unable to reverse the {rtype} record {owner}: {address}")]
    MalformedAddress {
        /// A or AAAA.
        rtype: RecordType,
        /// Owner of the offending record.
        owner: Name,
        /// The address data as found in the zone.
        address: String,
    },

    /// A PTR record that is not under `in-addr.arpa.` or `ip6.arpa.`.
    #[error("PTR record doesn't match IPv4 or IPv6: {owner}")]
    MalformedPtrOwner {
        /// Owner of the offending record.
        owner: Name,
    },
}

/// Result type for check operations.
pub type Result<T> = std::result::Result<T, CheckError>;
