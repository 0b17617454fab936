//! Check results and their presentation.

use std::collections::BTreeMap;
use std::fmt::{self, Write as _};

use hashbrown::HashSet;
use nscheck_proto::{Name, ResourceRecord};
use serde::ser::{Serialize, Serializer};

/// One of the three cross-checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckKind {
    /// A records against PTR records.
    A,
    /// AAAA records against PTR records.
    Aaaa,
    /// PTR records against A/AAAA records.
    Ptr,
}

impl CheckKind {
    /// All checks, in the order they run.
    pub const ALL: [CheckKind; 3] = [CheckKind::A, CheckKind::Aaaa, CheckKind::Ptr];

    /// Returns the lowercase label used in reports.
    pub const fn name(self) -> &'static str {
        match self {
            Self::A => "a",
            Self::Aaaa => "aaaa",
            Self::Ptr => "ptr",
        }
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Joins the owner names of `failed`, each once, in first-seen order.
///
/// ```rust
/// # use std::net::Ipv4Addr;
/// # use std::str::FromStr;
/// # use nscheck_proto::{Name, ResourceRecord};
/// let host = Name::from_str("host.zone.tld.").unwrap();
/// let failed = vec![
///     ResourceRecord::a(host.clone(), 60, Ipv4Addr::new(10, 0, 0, 1)),
///     ResourceRecord::a(host, 60, Ipv4Addr::new(10, 0, 0, 2)),
/// ];
/// assert_eq!(nscheck_check::format_failed(&failed, ", "), "host.zone.tld.");
/// assert_eq!(nscheck_check::format_failed(&[], ", "), "");
/// ```
pub fn format_failed(failed: &[ResourceRecord], separator: &str) -> String {
    unique_owners(failed).join(separator)
}

fn unique_owners(records: &[ResourceRecord]) -> Vec<&str> {
    let mut seen: HashSet<&Name> = HashSet::with_capacity(records.len());
    records
        .iter()
        .map(ResourceRecord::name)
        .filter(|name| seen.insert(*name))
        .map(Name::as_str)
        .collect()
}

/// Failures of every check run by
/// [`ConsistencyChecker::run_all`](crate::ConsistencyChecker::run_all).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckReport {
    failed: BTreeMap<CheckKind, Vec<ResourceRecord>>,
}

impl CheckReport {
    /// Creates a report with no failures.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the failures of one check, replacing earlier ones.
    pub fn set(&mut self, kind: CheckKind, failed: Vec<ResourceRecord>) {
        self.failed.insert(kind, failed);
    }

    /// Returns the failures of one check.
    pub fn failed(&self, kind: CheckKind) -> &[ResourceRecord] {
        self.failed.get(&kind).map_or(&[][..], Vec::as_slice)
    }

    /// Iterates over the checks that reported failures, in run order.
    pub fn failures(&self) -> impl Iterator<Item = (CheckKind, &[ResourceRecord])> {
        self.failed
            .iter()
            .filter(|(_, records)| !records.is_empty())
            .map(|(kind, records)| (*kind, records.as_slice()))
    }

    /// Total number of failed records.
    pub fn total_failures(&self) -> usize {
        self.failed.values().map(Vec::len).sum()
    }

    /// Returns true if no check reported a failure.
    pub fn is_consistent(&self) -> bool {
        self.total_failures() == 0
    }

    /// Renders the report as text: one block per failed check, with owner
    /// names joined by `separator`.
    pub fn to_text(&self, separator: &str) -> String {
        let mut out = String::new();
        for (kind, records) in self.failures() {
            let _ = writeln!(
                out,
                "Failed {kind} records:\n{}",
                format_failed(records, separator)
            );
        }
        out
    }

    /// Renders the report as pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[derive(serde::Serialize)]
struct KindView<'a> {
    names: Vec<&'a str>,
    records: Vec<String>,
}

#[derive(serde::Serialize)]
struct ReportView<'a> {
    consistent: bool,
    total_failures: usize,
    failed: BTreeMap<CheckKind, KindView<'a>>,
}

impl Serialize for CheckReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let failed = self
            .failures()
            .map(|(kind, records)| {
                let view = KindView {
                    names: unique_owners(records),
                    records: records.iter().map(ToString::to_string).collect(),
                };
                (kind, view)
            })
            .collect();
        ReportView {
            consistent: self.is_consistent(),
            total_failures: self.total_failures(),
            failed,
        }
        .serialize(serializer)
    }
}
