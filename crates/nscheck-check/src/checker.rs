//! The consistency checker.

use std::sync::Arc;

use nscheck_proto::{RecordType, ResourceRecord, ReverseZone};
use nscheck_zone::RecordStore;
use tracing::{debug, info, warn};

use crate::index::{build_forward, build_ptr, Index, IndexState};
use crate::report::{CheckKind, CheckReport};
use crate::Result;

/// Cross-checks forward and reverse records of one [`RecordStore`].
///
/// Indexes are built on first use and cached. A failed build is remembered
/// and reported by every later check until [`reset`](Self::reset) or
/// [`rebind`](Self::rebind).
#[derive(Debug, Clone)]
pub struct ConsistencyChecker {
    store: Arc<RecordStore>,
    a: IndexState,
    aaaa: IndexState,
    ptr: IndexState,
}

impl ConsistencyChecker {
    /// Creates a checker over `store`. No index is built yet.
    pub fn new(store: impl Into<Arc<RecordStore>>) -> Self {
        Self {
            store: store.into(),
            a: IndexState::Unbuilt,
            aaaa: IndexState::Unbuilt,
            ptr: IndexState::Unbuilt,
        }
    }

    /// Returns the store being checked.
    pub fn store(&self) -> &Arc<RecordStore> {
        &self.store
    }

    /// Builds every index not yet built, in the order A, AAAA, PTR.
    ///
    /// Stops at the first failure; later indexes stay unbuilt. Calling it
    /// again once everything is built does nothing.
    pub fn prepare(&mut self) -> Result<()> {
        self.prepare_a()?;
        self.prepare_aaaa()?;
        self.prepare_ptr()?;
        Ok(())
    }

    /// Builds the A index if needed.
    pub fn prepare_a(&mut self) -> Result<()> {
        let store = &self.store;
        self.a
            .ensure(|| build_forward(RecordType::A, store.iter_type(RecordType::A)))?;
        Ok(())
    }

    /// Builds the AAAA index if needed.
    pub fn prepare_aaaa(&mut self) -> Result<()> {
        let store = &self.store;
        self.aaaa
            .ensure(|| build_forward(RecordType::AAAA, store.iter_type(RecordType::AAAA)))?;
        Ok(())
    }

    /// Builds the PTR index if needed.
    pub fn prepare_ptr(&mut self) -> Result<()> {
        let store = &self.store;
        self.ptr
            .ensure(|| build_ptr(store.iter_type(RecordType::PTR)))?;
        Ok(())
    }

    /// Returns the A index state.
    pub fn a_index(&self) -> &IndexState {
        &self.a
    }

    /// Returns the AAAA index state.
    pub fn aaaa_index(&self) -> &IndexState {
        &self.aaaa
    }

    /// Returns the PTR index state.
    pub fn ptr_index(&self) -> &IndexState {
        &self.ptr
    }

    /// Returns true once all three indexes are built.
    pub fn is_prepared(&self) -> bool {
        self.a.is_built() && self.aaaa.is_built() && self.ptr.is_built()
    }

    /// Drops every cached index.
    pub fn reset(&mut self) {
        self.a = IndexState::Unbuilt;
        self.aaaa = IndexState::Unbuilt;
        self.ptr = IndexState::Unbuilt;
    }

    /// Points the checker at another store and drops every cached index.
    pub fn rebind(&mut self, store: impl Into<Arc<RecordStore>>) {
        self.store = store.into();
        self.reset();
    }

    /// Returns the A records of every owner with no address mapping back
    /// through a PTR record.
    pub fn check_a(&mut self) -> Result<Vec<ResourceRecord>> {
        self.prepare()?;
        Ok(self.with_indexes(|a, _, ptr| check_forward(a, ptr)))
    }

    /// Returns the AAAA records of every owner with no address mapping back
    /// through a PTR record.
    pub fn check_aaaa(&mut self) -> Result<Vec<ResourceRecord>> {
        self.prepare()?;
        Ok(self.with_indexes(|_, aaaa, ptr| check_forward(aaaa, ptr)))
    }

    /// Returns the PTR records of every reverse owner none of whose targets
    /// has an address mapping back to it.
    pub fn check_ptr(&mut self) -> Result<Vec<ResourceRecord>> {
        self.prepare()?;
        Ok(self.with_indexes(check_reverse))
    }

    /// Runs all three checks.
    pub fn run_all(&mut self) -> Result<CheckReport> {
        let mut report = CheckReport::new();
        for kind in CheckKind::ALL {
            let failed = match kind {
                CheckKind::A => self.check_a()?,
                CheckKind::Aaaa => self.check_aaaa()?,
                CheckKind::Ptr => self.check_ptr()?,
            };
            if failed.is_empty() {
                debug!(%kind, "check passed");
            } else {
                warn!(%kind, failed = failed.len(), "records without a matching counterpart");
            }
            report.set(kind, failed);
        }
        info!(
            records = self.store.len(),
            failures = report.total_failures(),
            "consistency check complete"
        );
        Ok(report)
    }

    /// Calls `f` with the three built indexes. Only valid after `prepare`
    /// succeeded; an unbuilt index is treated as empty.
    fn with_indexes<T>(&self, f: impl FnOnce(&Index, &Index, &Index) -> T) -> T {
        let empty = Index::new();
        f(
            self.a.built().unwrap_or(&empty),
            self.aaaa.built().unwrap_or(&empty),
            self.ptr.built().unwrap_or(&empty),
        )
    }
}

/// A forward owner passes when any of its reverse names owns a PTR record.
fn check_forward(forward: &Index, ptr: &Index) -> Vec<ResourceRecord> {
    let mut failed = Vec::new();
    for (_, links) in forward.iter() {
        if links.keys().any(|reverse| ptr.contains(reverse)) {
            continue;
        }
        failed.extend(links.values().cloned());
    }
    failed
}

/// A PTR owner passes when any target is a forward owner with an address
/// mapping back to it. IPv6 owners are matched against AAAA, all others
/// against A.
fn check_reverse(a: &Index, aaaa: &Index, ptr: &Index) -> Vec<ResourceRecord> {
    let mut failed = Vec::new();
    for (owner, targets) in ptr.iter() {
        let forward = match ReverseZone::classify(owner) {
            Some(ReverseZone::Ip6) => aaaa,
            _ => a,
        };
        let matched = targets.keys().any(|target| {
            forward
                .get(target)
                .is_some_and(|reverse| reverse.contains_key(owner))
        });
        if !matched {
            failed.extend(targets.values().cloned());
        }
    }
    failed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CheckError;
    use nscheck_proto::rdata::{A, AAAA};
    use nscheck_proto::{Name, RData};
    use std::collections::HashSet;
    use std::net::{Ipv4Addr, Ipv6Addr};
    use std::str::FromStr;

    fn name(s: &str) -> Name {
        Name::from_str(s).unwrap()
    }

    fn a(owner: &str, addr: [u8; 4]) -> ResourceRecord {
        ResourceRecord::a(name(owner), 3600, Ipv4Addr::from(addr))
    }

    fn aaaa(owner: &str, addr: &str) -> ResourceRecord {
        ResourceRecord::aaaa(name(owner), 3600, Ipv6Addr::from_str(addr).unwrap())
    }

    fn ptr(owner: &str, target: &str) -> ResourceRecord {
        ResourceRecord::ptr(name(owner), 3600, name(target))
    }

    fn rev6(addr: &str) -> String {
        nscheck_proto::reverse::ipv6_reverse_name(Ipv6Addr::from_str(addr).unwrap()).to_string()
    }

    fn set(records: Vec<ResourceRecord>) -> HashSet<ResourceRecord> {
        records.into_iter().collect()
    }

    /// A store modelled on a small site: two hosts with several addresses,
    /// some of them missing reverse entries, and a few stale PTR records.
    fn fixture() -> RecordStore {
        let mut store = RecordStore::new();
        // Fully matched.
        store.add(a("www.zone.tld.", [10, 0, 0, 1]));
        store.add(ptr("1.0.0.10.in-addr.arpa.", "www.zone.tld."));
        // One of three addresses has a PTR: passes.
        store.add(a("manager.zone.tld.", [10, 0, 128, 1]));
        store.add(a("manager.zone.tld.", [10, 0, 128, 2]));
        store.add(a("manager.zone.tld.", [10, 0, 128, 3]));
        store.add(ptr("3.128.0.10.in-addr.arpa.", "manager.zone.tld."));
        // Orphan A: both records fail.
        store.add(a("orphan.zone.tld.", [10, 0, 0, 7]));
        store.add(a("orphan.zone.tld.", [10, 0, 0, 8]));
        // Ghost PTR.
        store.add(ptr("9.0.0.10.in-addr.arpa.", "ghost.zone.tld."));
        // PTR whose target exists but with a different address.
        store.add(ptr("2.0.0.10.in-addr.arpa.", "www.zone.tld."));
        // IPv6.
        store.add(aaaa("www.zone.tld.", "2001:db8::1"));
        store.add(ptr(&rev6("2001:db8::1"), "www.zone.tld."));
        store.add(aaaa("v6only.zone.tld.", "2001:db8::99"));
        store
    }

    #[test]
    fn test_prepare_is_idempotent() {
        let mut checker = ConsistencyChecker::new(fixture());
        assert!(!checker.is_prepared());
        checker.prepare().unwrap();
        assert!(checker.is_prepared());

        assert_eq!(checker.a_index().built().unwrap().len(), 3);
        assert_eq!(
            checker
                .a_index()
                .built()
                .unwrap()
                .get(&name("manager.zone.tld."))
                .unwrap()
                .len(),
            3
        );
        assert_eq!(checker.aaaa_index().built().unwrap().len(), 2);
        assert_eq!(checker.ptr_index().built().unwrap().len(), 5);

        checker.prepare().unwrap();
        assert!(checker.is_prepared());
        assert_eq!(checker.ptr_index().built().unwrap().len(), 5);
    }

    #[test]
    fn test_check_a() {
        let mut checker = ConsistencyChecker::new(fixture());
        let failed = checker.check_a().unwrap();
        assert_eq!(
            set(failed),
            set(vec![
                a("orphan.zone.tld.", [10, 0, 0, 7]),
                a("orphan.zone.tld.", [10, 0, 0, 8]),
            ])
        );
    }

    #[test]
    fn test_check_aaaa() {
        let mut checker = ConsistencyChecker::new(fixture());
        let failed = checker.check_aaaa().unwrap();
        assert_eq!(failed, vec![aaaa("v6only.zone.tld.", "2001:db8::99")]);
    }

    #[test]
    fn test_check_ptr() {
        let mut checker = ConsistencyChecker::new(fixture());
        let failed = checker.check_ptr().unwrap();
        assert_eq!(
            set(failed),
            set(vec![
                ptr("9.0.0.10.in-addr.arpa.", "ghost.zone.tld."),
                ptr("2.0.0.10.in-addr.arpa.", "www.zone.tld."),
            ])
        );
    }

    #[test]
    fn test_symmetry_single_address() {
        let mut store = RecordStore::new();
        store.add(a("h.example.", [10, 0, 0, 1]));
        store.add(ptr("1.0.0.10.in-addr.arpa.", "h.example."));
        let mut checker = ConsistencyChecker::new(store);
        assert!(checker.check_a().unwrap().is_empty());
        assert!(checker.check_aaaa().unwrap().is_empty());
        assert!(checker.check_ptr().unwrap().is_empty());
    }

    #[test]
    fn test_any_reverse_suffices() {
        let mut store = RecordStore::new();
        for last in 1..=5 {
            store.add(a("multi.example.", [192, 0, 2, last]));
        }
        store.add(ptr("4.2.0.192.in-addr.arpa.", "multi.example."));
        let mut checker = ConsistencyChecker::new(store);
        assert!(checker.check_a().unwrap().is_empty());
    }

    #[test]
    fn test_dangling_ptr_always_reported() {
        let mut store = RecordStore::new();
        store.add(a("host.example.", [10, 0, 0, 1]));
        store.add(ptr("1.0.0.10.in-addr.arpa.", "host.example."));
        store.add(ptr("1.0.0.10.in-addr.arpa.", "nowhere.example."));
        store.add(ptr("5.0.0.10.in-addr.arpa.", "nowhere.example."));
        let mut checker = ConsistencyChecker::new(store);

        // The owner with one good target passes; the other does not.
        assert_eq!(
            checker.check_ptr().unwrap(),
            vec![ptr("5.0.0.10.in-addr.arpa.", "nowhere.example.")]
        );
    }

    #[test]
    fn test_ipv6_ptr_checked_against_aaaa() {
        let mut store = RecordStore::new();
        // Same owner name in A and AAAA; the IPv6 PTR must match via AAAA.
        store.add(a("dual.example.", [10, 0, 0, 1]));
        store.add(ptr(&rev6("2001:db8::5"), "dual.example."));
        let mut checker = ConsistencyChecker::new(store);
        assert_eq!(checker.check_ptr().unwrap().len(), 1);
        assert_eq!(checker.check_a().unwrap().len(), 1);
    }

    #[test]
    fn test_names_match_case_insensitively() {
        let mut store = RecordStore::new();
        store.add(a("Host.Example.", [10, 0, 0, 1]));
        store.add(ptr("1.0.0.10.IN-ADDR.ARPA.", "host.example."));
        let mut checker = ConsistencyChecker::new(store);
        assert!(checker.check_a().unwrap().is_empty());
        assert!(checker.check_ptr().unwrap().is_empty());
    }

    #[test]
    fn test_empty_store() {
        let mut checker = ConsistencyChecker::new(RecordStore::new());
        let report = checker.run_all().unwrap();
        assert!(report.is_consistent());
    }

    #[test]
    fn test_malformed_a_fails_every_check() {
        let mut store = fixture();
        let mut spoiled = a("spoiled.zone.tld.", [10, 0, 0, 42]);
        *spoiled.rdata_mut() = RData::A(A::from_octets(b"a"));
        store.add(spoiled);

        let mut checker = ConsistencyChecker::new(store);
        let err = checker.prepare().unwrap_err();
        assert!(matches!(err, CheckError::MalformedAddress { rtype: RecordType::A, .. }));
        assert!(checker.a_index().is_failed());
        assert!(checker.a_index().built().is_none());
        // Later indexes were never attempted.
        assert!(matches!(checker.aaaa_index(), IndexState::Unbuilt));

        assert_eq!(checker.check_a().unwrap_err(), err);
        assert_eq!(checker.check_aaaa().unwrap_err(), err);
        assert_eq!(checker.check_ptr().unwrap_err(), err);
        assert!(checker.run_all().is_err());
    }

    #[test]
    fn test_malformed_aaaa_fails_prepare() {
        let mut store = fixture();
        let mut spoiled = aaaa("spoiled.zone.tld.", "2001:db8::42");
        *spoiled.rdata_mut() = RData::AAAA(AAAA::from_octets(b"a"));
        store.add(spoiled);

        let mut checker = ConsistencyChecker::new(store);
        assert!(matches!(
            checker.prepare(),
            Err(CheckError::MalformedAddress { rtype: RecordType::AAAA, .. })
        ));
        assert!(checker.a_index().is_built());
        assert!(checker.aaaa_index().is_failed());
    }

    #[test]
    fn test_malformed_ptr_owner_fails_every_check() {
        let mut store = fixture();
        store.add(ptr("blahblah.", "www.zone.tld."));

        let mut checker = ConsistencyChecker::new(store);
        assert_eq!(
            checker.prepare().unwrap_err(),
            CheckError::MalformedPtrOwner {
                owner: name("blahblah.")
            }
        );
        assert!(checker.check_a().is_err());
        assert!(checker.check_aaaa().is_err());
        assert!(checker.check_ptr().is_err());
    }

    #[test]
    fn test_reset_and_rebind() {
        let mut bad = RecordStore::new();
        bad.add(ptr("blahblah.", "www.zone.tld."));

        let mut checker = ConsistencyChecker::new(fixture());
        checker.prepare().unwrap();

        // Built indexes survive until reset.
        checker.rebind(bad);
        assert!(!checker.is_prepared());
        assert!(checker.prepare().is_err());

        checker.rebind(Arc::new(fixture()));
        checker.prepare().unwrap();
        assert!(checker.is_prepared());

        checker.reset();
        assert!(matches!(checker.a_index(), IndexState::Unbuilt));
        assert_eq!(checker.check_a().unwrap().len(), 2);
    }

    #[test]
    fn test_run_all() {
        let mut checker = ConsistencyChecker::new(fixture());
        let report = checker.run_all().unwrap();
        assert!(!report.is_consistent());
        assert_eq!(report.failed(CheckKind::A).len(), 2);
        assert_eq!(report.failed(CheckKind::Aaaa).len(), 1);
        assert_eq!(report.failed(CheckKind::Ptr).len(), 2);
        assert_eq!(report.total_failures(), 5);
    }

    #[test]
    fn test_checkers_share_store() {
        let store = Arc::new(fixture());
        let mut first = ConsistencyChecker::new(Arc::clone(&store));
        let mut second = ConsistencyChecker::new(Arc::clone(&store));
        let (x, y) = std::thread::scope(|s| {
            let x = s.spawn(|| first.check_a().unwrap().len());
            let y = s.spawn(|| second.check_ptr().unwrap().len());
            (x.join().unwrap(), y.join().unwrap())
        });
        assert_eq!((x, y), (2, 2));
        assert!(Arc::ptr_eq(first.store(), &store));
    }
}
