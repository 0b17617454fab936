//! Record storage.
//!
//! A [`RecordStore`] holds every record loaded from one or more zone files in
//! load order, plus a per-type index. The index stores positions into the
//! ordered list, so every record belongs to exactly one type bucket.

use hashbrown::HashMap;
use nscheck_proto::{ResourceRecord, Type};

/// All records from one or more zone files, grouped by type.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    /// Every record, in insertion order.
    all: Vec<ResourceRecord>,
    /// Positions in `all`, bucketed by record type.
    by_type: HashMap<Type, Vec<usize>>,
}

impl RecordStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record.
    pub fn add(&mut self, record: ResourceRecord) {
        let position = self.all.len();
        self.by_type
            .entry(record.rtype())
            .or_default()
            .push(position);
        self.all.push(record);
    }

    /// Appends every record of `other` after the records already present.
    ///
    /// The incoming store's own order is preserved, both overall and within
    /// each type bucket.
    pub fn merge(&mut self, other: RecordStore) {
        let offset = self.all.len();
        for (rtype, positions) in other.by_type {
            self.by_type
                .entry(rtype)
                .or_default()
                .extend(positions.into_iter().map(|p| p + offset));
        }
        self.all.extend(other.all);
    }

    /// Returns a copy of all records, in insertion order.
    pub fn list(&self) -> Vec<ResourceRecord> {
        self.all.clone()
    }

    /// Iterates over all records, in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, ResourceRecord> {
        self.all.iter()
    }

    /// Returns a copy of the records of one type, or an empty vector.
    pub fn records_of_type(&self, rtype: impl Into<Type>) -> Vec<ResourceRecord> {
        self.iter_type(rtype).cloned().collect()
    }

    /// Iterates over the records of one type, in insertion order.
    pub fn iter_type(&self, rtype: impl Into<Type>) -> TypeIter<'_> {
        let rtype: Type = rtype.into();
        let positions = self.by_type.get(&rtype).map_or(&[][..], Vec::as_slice);
        TypeIter {
            all: &self.all,
            positions: positions.iter(),
        }
    }

    /// Returns the number of records of one type.
    pub fn count_of_type(&self, rtype: impl Into<Type>) -> usize {
        let rtype: Type = rtype.into();
        self.by_type.get(&rtype).map_or(0, Vec::len)
    }

    /// Returns the distinct types present, in no particular order.
    pub fn types_present(&self) -> Vec<Type> {
        self.by_type.keys().copied().collect()
    }

    /// Returns the distinct types present as mnemonics, in no particular order.
    pub fn type_names(&self) -> Vec<String> {
        self.by_type.keys().map(ToString::to_string).collect()
    }

    /// Returns the total number of records.
    pub fn len(&self) -> usize {
        self.all.len()
    }

    /// Returns true if no records are stored.
    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }
}

/// Iterator over the records of a single type.
#[derive(Debug, Clone)]
pub struct TypeIter<'a> {
    all: &'a [ResourceRecord],
    positions: std::slice::Iter<'a, usize>,
}

impl<'a> Iterator for TypeIter<'a> {
    type Item = &'a ResourceRecord;

    fn next(&mut self) -> Option<Self::Item> {
        self.positions.next().map(|&position| &self.all[position])
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.positions.size_hint()
    }
}

impl ExactSizeIterator for TypeIter<'_> {}

impl Extend<ResourceRecord> for RecordStore {
    fn extend<I: IntoIterator<Item = ResourceRecord>>(&mut self, iter: I) {
        for record in iter {
            self.add(record);
        }
    }
}

impl FromIterator<ResourceRecord> for RecordStore {
    fn from_iter<I: IntoIterator<Item = ResourceRecord>>(iter: I) -> Self {
        let mut store = Self::new();
        store.extend(iter);
        store
    }
}

impl<'a> IntoIterator for &'a RecordStore {
    type Item = &'a ResourceRecord;
    type IntoIter = std::slice::Iter<'a, ResourceRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
