//! # nscheck zone loading
//!
//! This crate turns zone files on disk into a [`RecordStore`]:
//!
//! - **Record storage**: all records in load order, indexed by type
//! - **Zone file parsing**: RFC 1035 master file format with directives
//! - **Directory loading**: recursive traversal and multi-directory merge
//!
//! ## Example
//!
//! ```rust,ignore
//! use nscheck_zone::{load_directories, RecordStore};
//! use nscheck_proto::RecordType;
//!
//! let store: RecordStore = load_directories(&["zones/forward", "zones/reverse"])?;
//! println!("{} A records", store.records_of_type(RecordType::A).len());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]

pub mod directory;
pub mod parser;
pub mod store;

use std::path::{Path, PathBuf};

use thiserror::Error;

pub use directory::{load_directories, load_directories_with, parse_directory, parse_directory_with};
pub use parser::ZoneFileParser;
pub use store::RecordStore;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur while loading zones.
#[derive(Debug, Error)]
pub enum ZoneError {
    /// A zone file or directory could not be read.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// The path being accessed.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Zone file syntax error.
    #[error("{file}:{line}: {message}")]
    ParseError {
        /// The file (or source label) being parsed.
        file: String,
        /// Line number where the entry starts.
        line: usize,
        /// Description of the error.
        message: String,
    },

    /// `$INCLUDE` nesting went past the configured limit.
    #[error("{file}:{line}: maximum $INCLUDE depth of {max} exceeded")]
    IncludeDepth {
        /// The file containing the offending directive.
        file: String,
        /// Line of the directive.
        line: usize,
        /// The configured limit.
        max: usize,
    },

    /// Directory traversal failed.
    #[error("cannot walk {}: {source}", .path.display())]
    Walk {
        /// The directory being walked.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: walkdir::Error,
    },
}

impl ZoneError {
    /// Creates a new parse error.
    pub fn parse(file: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Self::ParseError {
            file: file.into(),
            line,
            message: message.into(),
        }
    }

    /// Creates a new I/O error for `path`.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Returns true if this error came from zone file syntax.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::ParseError { .. } | Self::IncludeDepth { .. })
    }
}

/// Result type for zone operations.
pub type Result<T> = std::result::Result<T, ZoneError>;
