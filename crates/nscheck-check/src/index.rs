//! Reverse-lookup indexes.
//!
//! Every index maps an outer name to a set of inner names, each carrying
//! the record that produced the pair:
//!
//! | index | outer name     | inner name             |
//! |-------|----------------|------------------------|
//! | A     | forward owner  | `in-addr.arpa.` name   |
//! | AAAA  | forward owner  | `ip6.arpa.` name       |
//! | PTR   | reverse owner  | PTR target             |
//!
//! Inner maps are created on first insert, so a present outer name never
//! maps to an empty set.

use hashbrown::HashMap;
use nscheck_proto::{Name, RData, RecordType, ResourceRecord, ReverseZone};
use tracing::debug;

use crate::{CheckError, Result};

/// Inner names of one outer name, with the record behind each.
pub type Links = HashMap<Name, ResourceRecord>;

/// A two-level name index.
#[derive(Debug, Clone, Default)]
pub struct Index {
    entries: HashMap<Name, Links>,
}

impl Index {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `outer -> inner`. A repeated pair replaces the stored record.
    pub fn insert(&mut self, outer: Name, inner: Name, record: ResourceRecord) {
        self.entries.entry(outer).or_default().insert(inner, record);
    }

    /// Returns the links of an outer name.
    pub fn get(&self, outer: &Name) -> Option<&Links> {
        self.entries.get(outer)
    }

    /// Returns true if `outer` has at least one link.
    pub fn contains(&self, outer: &Name) -> bool {
        self.entries.contains_key(outer)
    }

    /// Iterates over outer names and their links.
    pub fn iter(&self) -> impl Iterator<Item = (&Name, &Links)> {
        self.entries.iter()
    }

    /// Number of outer names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the index has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Build state of one index.
#[derive(Debug, Clone, Default)]
pub enum IndexState {
    /// Not built yet, or reset.
    #[default]
    Unbuilt,
    /// Built and cached.
    Built(Index),
    /// The last build failed; the error is returned until the state is reset.
    Failed(CheckError),
}

impl IndexState {
    /// Builds the index if it is unbuilt. A built index is kept; a failed
    /// one reports its error again.
    pub(crate) fn ensure(&mut self, build: impl FnOnce() -> Result<Index>) -> Result<&Index> {
        if matches!(self, Self::Unbuilt) {
            *self = match build() {
                Ok(index) => Self::Built(index),
                Err(err) => Self::Failed(err),
            };
        }
        match self {
            Self::Built(index) => Ok(index),
            Self::Failed(err) => Err(err.clone()),
            Self::Unbuilt => unreachable!("index state set above"),
        }
    }

    /// Returns the index if built.
    pub fn built(&self) -> Option<&Index> {
        match self {
            Self::Built(index) => Some(index),
            _ => None,
        }
    }

    /// Returns true if the index is built.
    pub fn is_built(&self) -> bool {
        matches!(self, Self::Built(_))
    }

    /// Returns true if the last build failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Indexes address records by owner and reverse name.
///
/// Records of `rtype` whose data is not an address of that family, or whose
/// address has the wrong length, abort the build.
pub(crate) fn build_forward<'a>(
    rtype: RecordType,
    records: impl Iterator<Item = &'a ResourceRecord>,
) -> Result<Index> {
    let mut index = Index::new();
    for record in records {
        let reverse = match (rtype, record.rdata()) {
            (RecordType::A, RData::A(a)) => a.reverse_name().ok(),
            (RecordType::AAAA, RData::AAAA(aaaa)) => aaaa.reverse_name().ok(),
            _ => None,
        };
        let Some(reverse) = reverse else {
            return Err(CheckError::MalformedAddress {
                rtype,
                owner: record.name().clone(),
                address: record.rdata().to_string(),
            });
        };
        index.insert(record.name().clone(), reverse, record.clone());
    }
    debug!(%rtype, names = index.len(), "built forward index");
    Ok(index)
}

/// Indexes PTR records by owner and target.
///
/// Every owner must sit strictly below `in-addr.arpa.` or `ip6.arpa.`.
pub(crate) fn build_ptr<'a>(records: impl Iterator<Item = &'a ResourceRecord>) -> Result<Index> {
    let mut index = Index::new();
    for record in records {
        let owner = record.name();
        let target = match (ReverseZone::classify(owner), record.rdata().ptr_target()) {
            (Some(_), Some(target)) => target.clone(),
            _ => {
                return Err(CheckError::MalformedPtrOwner {
                    owner: owner.clone(),
                })
            }
        };
        index.insert(owner.clone(), target, record.clone());
    }
    debug!(names = index.len(), "built PTR index");
    Ok(index)
}
