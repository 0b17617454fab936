//! Error types for the DNS data model.

use thiserror::Error;

/// Result type alias for data model operations.
pub type Result<T> = std::result::Result<T, Error>;

/// DNS data model errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // =========================================================================
    // Domain Name Errors
    // =========================================================================
    /// Label exceeds maximum length of 63 bytes.
    #[error("label too long: {length} bytes exceeds maximum of 63")]
    LabelTooLong {
        /// Actual label length.
        length: usize,
    },

    /// Domain name exceeds maximum length of 255 bytes.
    #[error("name too long: {length} bytes exceeds maximum of 255")]
    NameTooLong {
        /// Length the name would have in wire format.
        length: usize,
    },

    /// Empty label in the middle of a domain name.
    #[error("empty label at position {position} (only allowed at end for root)")]
    EmptyLabel {
        /// Index of the empty label.
        position: usize,
    },

    /// Invalid label character.
    #[error("invalid character '{character}' in label at position {position}")]
    InvalidLabelChar {
        /// The invalid character.
        character: char,
        /// Position in the label.
        position: usize,
    },

    // =========================================================================
    // Record Data Errors
    // =========================================================================
    /// Address record carries the wrong number of octets.
    #[error("{rtype} address must be {expected} octets, got {actual}")]
    AddressLength {
        /// The record type being decoded.
        rtype: &'static str,
        /// Required number of octets.
        expected: usize,
        /// Octets actually present.
        actual: usize,
    },

    /// Unrecognized record type mnemonic.
    #[error("unknown record type: {0}")]
    UnknownType(String),

    /// Unrecognized record class mnemonic.
    #[error("unknown record class: {0}")]
    UnknownClass(String),

    /// Malformed RFC 3597 generic RDATA (`\# <len> <hex>`).
    #[error("invalid generic rdata: {0}")]
    InvalidGenericData(String),
}
